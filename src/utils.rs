//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_ai_credentials, check_dataset, AiCredentialInfo};
pub use settings::{RouteSettings, Settings, TracingSettings};
