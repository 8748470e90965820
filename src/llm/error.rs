//! Route pipeline error handling.

use thiserror::Error;

/// Errors raised while turning a route request into a route profile.
#[derive(Error, Debug)]
pub enum RouteError {
    /// API key not found in environment variables or settings.
    #[error(
        "OpenAI API key not found. Set OPENAI_API_KEY or OPENAI_AUTH_TOKEN environment variable"
    )]
    ApiKeyNotFound,

    /// Any other configuration problem detected before a request is sent.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Completion API answered with a non-success status.
    #[error("Completion API request failed: {0}")]
    ApiRequestFailed(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The completion API envelope could not be decoded.
    #[error("Invalid response format from completion API: {0}")]
    InvalidResponseFormat(String),

    /// The model's reply does not conform to the route profile schema.
    #[error("Route profile validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Broad failure classes used by callers that only care about the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteErrorKind {
    /// Missing credential or invalid settings; raised before any request.
    Configuration,
    /// Model output failed schema conformance.
    Validation,
    /// Network or service-level failure of the completion call.
    Transport,
}

impl RouteError {
    /// Classifies the error.
    pub fn kind(&self) -> RouteErrorKind {
        match self {
            Self::ApiKeyNotFound | Self::ConfigurationError(_) => RouteErrorKind::Configuration,
            Self::Validation(_) => RouteErrorKind::Validation,
            Self::ApiRequestFailed(_) | Self::NetworkError(_) | Self::InvalidResponseFormat(_) => {
                RouteErrorKind::Transport
            }
        }
    }
}

/// Schema violations found in a model reply.
///
/// Every variant names the offending field with a dotted path
/// (`rain_days_year.days`), or `$` for the document root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The reply could not be read as JSON at all.
    #[error("response is not valid JSON: {0}")]
    MalformedJson(String),

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// A sequence has the wrong number of entries.
    #[error("field `{field}` must contain exactly {expected} entries, got {actual}")]
    Cardinality {
        /// Dotted path of the field.
        field: String,
        /// Required number of entries.
        expected: usize,
        /// Number of entries found.
        actual: usize,
    },

    /// A value has the wrong type and cannot be coerced.
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the field.
        field: String,
        /// Declared type.
        expected: &'static str,
        /// Short rendering of the offending value.
        found: String,
    },

    /// A numeric value is outside its allowed range.
    #[error("field `{field}` is out of range: {reason}")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// Which bound was violated.
        reason: String,
    },
}

impl ValidationError {
    /// Returns the dotted path of the offending field, if the error has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedJson(_) => None,
            Self::MissingField(field)
            | Self::Cardinality { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::OutOfRange { field, .. } => Some(field),
        }
    }
}

/// Returns the [`RouteErrorKind`] of an `anyhow` error, if it wraps a [`RouteError`].
pub fn error_kind(err: &anyhow::Error) -> Option<RouteErrorKind> {
    err.downcast_ref::<RouteError>().map(RouteError::kind)
}
