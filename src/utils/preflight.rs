//! Preflight validation checks for early failure detection.
//!
//! Commands call these before any network request so a missing credential
//! or dataset fails fast with a clear message.

use std::path::Path;

use anyhow::{bail, Result};

use crate::llm::error::RouteError;
use crate::utils::settings::RouteSettings;

/// Result of credential validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiCredentialInfo {
    /// Completion endpoint that will be used.
    pub base_url: String,
    /// Model that will be used.
    pub model: String,
}

/// Validates that a completion API key is configured.
///
/// Performs no network I/O.
pub fn check_ai_credentials(settings: &RouteSettings) -> Result<AiCredentialInfo> {
    match settings.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(AiCredentialInfo {
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
        }),
        _ => Err(RouteError::ApiKeyNotFound.into()),
    }
}

/// Validates that the city dataset exists and is a regular file.
pub fn check_dataset(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(
            "City dataset not found at {}.\n\
             Pass --dataset or set ROUTE_PROFILER_DATASET.",
            path.display()
        );
    }
    if !path.is_file() {
        bail!("City dataset path is not a file: {}", path.display());
    }
    Ok(())
}
