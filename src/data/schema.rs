//! Format instructions derived from the route profile schema.
//!
//! The instructions are embedded verbatim in every system prompt, so they
//! must be byte-identical for the lifetime of the process.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use crate::data::route::RouteAnalysis;

const FORMAT_PREAMBLE: &str = r#"The output must be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"description": "a list of strings", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Here is the output schema:
```"#;

static FORMAT_INSTRUCTIONS: OnceCell<String> = OnceCell::new();

/// Returns the JSON schema of [`RouteAnalysis`] as a compact JSON value.
///
/// The generator's top-level `title` and `$schema` keys are dropped.
pub fn route_analysis_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(RouteAnalysis);
    let mut value =
        serde_json::to_value(schema).context("Failed to serialize route analysis schema")?;

    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }

    Ok(value)
}

/// Builds the format instructions from scratch.
///
/// Prefer [`format_instructions`], which computes this once per process.
pub fn build_format_instructions() -> Result<String> {
    let schema = route_analysis_schema()?;
    let schema_text =
        serde_json::to_string(&schema).context("Failed to render route analysis schema")?;

    Ok(format!("{FORMAT_PREAMBLE}\n{schema_text}\n```"))
}

/// Returns the cached format instructions, building them on first use.
///
/// Concurrent first callers block until the single initialisation finishes.
pub fn format_instructions() -> Result<&'static str> {
    FORMAT_INSTRUCTIONS
        .get_or_try_init(build_format_instructions)
        .map(String::as_str)
}
