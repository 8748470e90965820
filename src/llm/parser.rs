//! Strict parsing of model replies into [`RouteAnalysis`].
//!
//! The completion service gives no structural guarantee over its output, so
//! every field is checked explicitly. Nothing is defaulted, truncated or
//! padded: a reply either conforms or produces a [`ValidationError`] naming
//! the offending field.

use serde_json::{Map, Value};
use tracing::debug;

use crate::data::route::{RainData, RouteAnalysis, CLIMATE_SUMMARY_POINTS};
use crate::llm::error::ValidationError;

/// Parses raw model text into a validated route profile.
///
/// Candidate spans are tried in order: a `json` code fence, any other code
/// fence, the outermost `{...}` span, then the whole text. The first one that
/// decodes as JSON is validated.
pub fn parse_route_analysis(content: &str) -> Result<RouteAnalysis, ValidationError> {
    let mut first_error = None;

    for candidate in json_candidates(content) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return route_analysis_from_value(&value),
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "Candidate is not valid JSON");
                first_error.get_or_insert(e);
            }
        }
    }

    debug!(raw_response = %content, "Route analysis response is not valid JSON");
    Err(ValidationError::MalformedJson(
        first_error.map_or_else(|| "empty response".to_string(), |e| e.to_string()),
    ))
}

/// Validates an already-decoded JSON value against the route profile schema.
pub fn route_analysis_from_value(value: &Value) -> Result<RouteAnalysis, ValidationError> {
    let root = as_object(value, "$")?;

    let distance = required_f64(root, "distance_km_from_home", "distance_km_from_home")?;
    let region_type = required_string(root, "region_type", "region_type")?;
    let climate_summary = required_climate_summary(root)?;
    let rain_days_year = required_rain_data(root)?;

    RouteAnalysis::new(distance, region_type, climate_summary, rain_days_year)
}

/// Spans of a reply that may hold the JSON document, most specific first.
fn json_candidates(content: &str) -> Vec<&str> {
    let brace_span = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&content[start..=end]),
        _ => None,
    };

    let mut candidates = Vec::with_capacity(4);
    for candidate in [
        fenced_block(content, "```json"),
        fenced_block(content, "```"),
        brace_span,
        Some(content.trim()),
    ]
    .into_iter()
    .flatten()
    {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Body of the first fence opened by `opener`, without its language tag.
fn fenced_block<'a>(content: &'a str, opener: &str) -> Option<&'a str> {
    let (_, after) = content.split_once(opener)?;
    let (block, _) = after.split_once("```")?;

    let body = match block.split_once('\n') {
        Some((tag, rest)) if is_fence_tag(tag) => rest,
        _ => block,
    };
    Some(body.trim())
}

/// A fence info string such as `JSON`, `javascript` or `json5`.
fn is_fence_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::TypeMismatch {
        field: path.to_string(),
        expected: "object",
        found: describe(value),
    })
}

fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, ValidationError> {
    object
        .get(key)
        .ok_or_else(|| ValidationError::MissingField(path.to_string()))
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, ValidationError> {
    match required(object, key, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::TypeMismatch {
            field: path.to_string(),
            expected: "string",
            found: describe(other),
        }),
    }
}

/// Reads a number, accepting numeric strings such as `"290.5"`.
fn required_f64(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<f64, ValidationError> {
    let value = required(object, key, path)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::TypeMismatch {
            field: path.to_string(),
            expected: "number",
            found: describe(value),
        }),
    }
}

/// Reads an integral number, accepting `2023`, `2023.0` and `"2023"`.
fn required_i64(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<i64, ValidationError> {
    let value = required(object, key, path)?;
    let mismatch = || ValidationError::TypeMismatch {
        field: path.to_string(),
        expected: "integer",
        found: describe(value),
    };

    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
    }

    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    }
    .ok_or_else(mismatch)?;

    if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Ok(float as i64)
    } else {
        Err(mismatch())
    }
}

fn required_climate_summary(
    object: &Map<String, Value>,
) -> Result<[String; CLIMATE_SUMMARY_POINTS], ValidationError> {
    const PATH: &str = "climate_summary";

    let items = match required(object, PATH, PATH)? {
        Value::Array(items) => items,
        other => {
            return Err(ValidationError::TypeMismatch {
                field: PATH.to_string(),
                expected: "array of strings",
                found: describe(other),
            })
        }
    };

    if items.len() != CLIMATE_SUMMARY_POINTS {
        return Err(ValidationError::Cardinality {
            field: PATH.to_string(),
            expected: CLIMATE_SUMMARY_POINTS,
            actual: items.len(),
        });
    }

    let points = items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValidationError::TypeMismatch {
                field: format!("{PATH}[{i}]"),
                expected: "string",
                found: describe(other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Length was checked above.
    points
        .try_into()
        .map_err(|points: Vec<String>| ValidationError::Cardinality {
            field: PATH.to_string(),
            expected: CLIMATE_SUMMARY_POINTS,
            actual: points.len(),
        })
}

fn required_rain_data(object: &Map<String, Value>) -> Result<RainData, ValidationError> {
    const PATH: &str = "rain_days_year";

    let rain = as_object(required(object, PATH, PATH)?, PATH)?;

    let year_path = format!("{PATH}.year");
    let year = required_i64(rain, "year", &year_path)?;
    let year = i32::try_from(year).map_err(|_| ValidationError::OutOfRange {
        field: year_path,
        reason: format!("{year} does not fit a calendar year"),
    })?;

    let days_path = format!("{PATH}.days");
    let days = required_i64(rain, "days", &days_path)?;
    if days < 0 {
        return Err(ValidationError::OutOfRange {
            field: days_path,
            reason: format!("must be non-negative, got {days}"),
        });
    }
    let days = u32::try_from(days).map_err(|_| ValidationError::OutOfRange {
        field: days_path,
        reason: format!("{days} is too large"),
    })?;

    Ok(RainData::new(year, days))
}

/// Short, bounded rendering of a JSON value for error messages.
fn describe(value: &Value) -> String {
    const MAX_LEN: usize = 40;

    let rendered = match value {
        Value::Null => return "null".to_string(),
        Value::Array(items) => return format!("array of {}", items.len()),
        Value::Object(_) => return "object".to_string(),
        other => other.to_string(),
    };

    if rendered.chars().count() > MAX_LEN {
        let truncated: String = rendered.chars().take(MAX_LEN).collect();
        format!("{truncated}...")
    } else {
        rendered
    }
}
