//! Single route profile command.

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::route::RouteRequest;
use crate::llm::context::RouteContext;
use crate::utils::preflight::check_ai_credentials;
use crate::utils::settings::RouteSettings;

/// Profiles one origin/destination pair and prints it as JSON.
#[derive(Parser)]
pub struct RouteCommand {
    /// Origin city.
    pub origin: String,
    /// Destination city (e.g. "Florianópolis, SC").
    pub destination: String,
    /// Model to use (overrides OPENAI_MODEL).
    #[arg(long)]
    pub model: Option<String>,
}

impl RouteCommand {
    /// Executes the route command.
    pub async fn execute(self) -> Result<()> {
        let mut settings = RouteSettings::load()?;
        if let Some(model) = self.model {
            settings.model = model;
        }

        let ai_info = check_ai_credentials(&settings)?;
        eprintln!("Using {} (model: {})", ai_info.base_url, ai_info.model);

        let context = RouteContext::new(settings);
        let request = RouteRequest::new(self.origin, self.destination);
        let analysis = context.pipeline()?.invoke(&request).await.with_context(|| {
            format!(
                "Failed to profile route {} -> {}",
                request.origin, request.destination
            )
        })?;

        println!("{}", analysis.to_pretty_json()?);
        Ok(())
    }
}
