//! Settings and configuration utilities.
//!
//! This module reads settings from $HOME/.route-profiler/settings.json and
//! uses them as a fallback for environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::llm::ai::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::ai::DEFAULT_REQUEST_TIMEOUT;
use crate::llm::error::RouteError;

/// Environment variables holding the completion API key, in lookup order.
pub const API_KEY_VARS: &[&str] = &["OPENAI_API_KEY", "OPENAI_AUTH_TOKEN"];

/// Default number of completion calls a batch keeps in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default location of the city dataset.
pub const DEFAULT_DATASET_PATH: &str = "data/cidades.csv";

/// Settings loaded from $HOME/.route-profiler/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // A missing file means no overrides
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".route-profiler").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }

    /// Returns the first of `keys` that is set and non-empty.
    pub fn get_first_env_var(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get_env_var(key))
            .find(|value| !value.trim().is_empty())
    }

    /// Returns a boolean flag; only `true` and `1` switch it on.
    pub fn get_flag(&self, key: &str) -> bool {
        self.get_env_var(key)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
    }
}

/// Call-tracing toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracingSettings {
    /// Whether pipeline calls are traced.
    pub enabled: bool,
    /// Project tag attached to traced calls.
    pub project: Option<String>,
}

/// Resolved configuration of the route pipeline.
///
/// Built once at startup and handed to
/// [`RouteContext`](crate::llm::context::RouteContext).
#[derive(Clone, PartialEq, Eq)]
pub struct RouteSettings {
    /// Completion API key; `None` until a client is needed.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Completion API base URL.
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Maximum completion calls in flight during a batch.
    pub concurrency: usize,
    /// City dataset path.
    pub dataset_path: PathBuf,
    /// Call-tracing toggles.
    pub tracing: TracingSettings,
}

impl std::fmt::Debug for RouteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("concurrency", &self.concurrency)
            .field("dataset_path", &self.dataset_path)
            .field("tracing", &self.tracing)
            .finish()
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            tracing: TracingSettings::default(),
        }
    }
}

impl RouteSettings {
    /// Resolves settings from the environment and the default settings file.
    pub fn load() -> Result<Self> {
        Self::from_settings(&Settings::load()?)
    }

    /// Resolves settings from the environment with `settings` as fallback.
    ///
    /// A missing API key is not an error here; it surfaces when the
    /// completion client is first built.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let defaults = Self::default();

        let request_timeout = match settings.get_env_var("ROUTE_PROFILER_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("ROUTE_PROFILER_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        let concurrency = match settings.get_env_var("ROUTE_PROFILER_CONCURRENCY") {
            Some(raw) => parse_positive("ROUTE_PROFILER_CONCURRENCY", &raw)? as usize,
            None => defaults.concurrency,
        };

        Ok(Self {
            api_key: settings.get_first_env_var(API_KEY_VARS),
            model: settings
                .get_env_var("OPENAI_MODEL")
                .unwrap_or(defaults.model),
            base_url: settings
                .get_env_var("OPENAI_BASE_URL")
                .unwrap_or(defaults.base_url),
            request_timeout,
            concurrency,
            dataset_path: settings
                .get_env_var("ROUTE_PROFILER_DATASET")
                .map_or(defaults.dataset_path, PathBuf::from),
            tracing: TracingSettings {
                enabled: settings.get_flag("ROUTE_PROFILER_TRACING"),
                project: settings
                    .get_env_var("ROUTE_PROFILER_PROJECT")
                    .filter(|p| !p.trim().is_empty()),
            },
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(RouteError::ConfigurationError(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))
        .into()),
    }
}
