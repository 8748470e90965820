//! CLI interface for route-profiler.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod batch;
pub mod cities;
pub mod route;
pub mod schema;

/// route-profiler: structured route profiles generated by an LLM.
#[derive(Parser)]
#[command(name = "route-profiler")]
#[command(about = "Structured route profiles between cities, generated by an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Profiles a single origin/destination pair.
    Route(route::RouteCommand),
    /// Profiles every dataset city relative to one origin.
    Batch(batch::BatchCommand),
    /// Lists the city dataset.
    Cities(cities::CitiesCommand),
    /// Prints the output format instructions sent to the model.
    Schema(schema::SchemaCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Route(cmd) => cmd.execute().await,
            Commands::Batch(cmd) => cmd.execute().await,
            Commands::Cities(cmd) => cmd.execute(),
            Commands::Schema(cmd) => cmd.execute(),
        }
    }
}
