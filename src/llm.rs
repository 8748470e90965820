//! LLM integration for route profile generation.

pub mod ai;
pub mod context;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod prompts;
#[cfg(test)]
pub(crate) mod test_utils;

pub use ai::openai::OpenAiAiClient;
pub use ai::{AiClient, AiClientMetadata};
pub use context::RouteContext;
pub use error::{RouteError, RouteErrorKind, ValidationError};
pub use pipeline::RoutePipeline;
