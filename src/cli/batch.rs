//! Batch route profiling command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::batch::{run_batch, run_batch_each};
use crate::data::cities::load_cities;
use crate::data::route::RouteAnalysis;
use crate::llm::context::RouteContext;
use crate::utils::preflight::{check_ai_credentials, check_dataset};
use crate::utils::settings::RouteSettings;

/// Rule printed after every profile.
const SEPARATOR: &str =
    "================================================================================";

/// Profiles every dataset city relative to one origin.
#[derive(Parser)]
pub struct BatchCommand {
    /// Origin city; dataset rows with the same city are skipped.
    #[arg(long)]
    pub origin: String,

    /// Path to the city dataset CSV (overrides ROUTE_PROFILER_DATASET).
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Maximum completion requests in flight (overrides ROUTE_PROFILER_CONCURRENCY).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Model to use (overrides OPENAI_MODEL).
    #[arg(long)]
    pub model: Option<String>,

    /// Report failed destinations and continue instead of aborting the batch.
    #[arg(long)]
    pub keep_going: bool,
}

impl BatchCommand {
    /// Executes the batch command.
    pub async fn execute(self) -> Result<()> {
        let mut settings = RouteSettings::load()?;
        if let Some(dataset) = self.dataset {
            settings.dataset_path = dataset;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = usize::from(concurrency);
        }
        if let Some(model) = self.model {
            settings.model = model;
        }

        check_dataset(&settings.dataset_path)?;
        let ai_info = check_ai_credentials(&settings)?;

        let cities = load_cities(&settings.dataset_path)?;
        eprintln!(
            "Profiling {} dataset cities from {} using {} (model: {})",
            cities.len(),
            self.origin,
            ai_info.base_url,
            ai_info.model
        );

        let context = RouteContext::new(settings);
        let pipeline = context.pipeline()?;

        if !self.keep_going {
            for (destination, analysis) in run_batch(pipeline, &cities, &self.origin).await? {
                println!("{}", render_profile(&destination, &analysis)?);
            }
            return Ok(());
        }

        let mut failed = Vec::new();
        for (destination, result) in run_batch_each(pipeline, &cities, &self.origin).await {
            match result {
                Ok(analysis) => println!("{}", render_profile(&destination, &analysis)?),
                Err(e) => {
                    eprintln!("warning: failed to profile {destination}: {e:#}");
                    failed.push(destination);
                }
            }
        }

        if !failed.is_empty() {
            bail!(
                "{} destination(s) failed: {}",
                failed.len(),
                failed.join("; ")
            );
        }
        Ok(())
    }
}

/// Renders one destination block: label, pretty JSON, separator rule.
pub fn render_profile(destination: &str, analysis: &RouteAnalysis) -> Result<String> {
    Ok(format!(
        "{destination}\n{}\n{SEPARATOR}",
        analysis.to_pretty_json()?
    ))
}
