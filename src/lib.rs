//! # route-profiler
//!
//! Structured route profiles between Brazilian cities, generated by an LLM
//! and validated against a strict schema.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use route_profiler::data::RouteRequest;
//! use route_profiler::llm::RouteContext;
//! use route_profiler::utils::RouteSettings;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let context = RouteContext::new(RouteSettings::load()?);
//! let profile = context
//!     .pipeline()?
//!     .invoke(&RouteRequest::new("Criciúma", "Florianópolis, SC"))
//!     .await?;
//! println!("{}", profile.to_pretty_json()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod data;
pub mod llm;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of route-profiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
