//! City dataset listing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::data::cities::{load_cities, summarise_cities};
use crate::utils::preflight::check_dataset;
use crate::utils::settings::RouteSettings;

/// Lists the cities available in the dataset.
#[derive(Parser)]
pub struct CitiesCommand {
    /// Path to the city dataset CSV (overrides ROUTE_PROFILER_DATASET).
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

impl CitiesCommand {
    /// Executes the cities command.
    pub fn execute(self) -> Result<()> {
        let dataset = match self.dataset {
            Some(path) => path,
            None => RouteSettings::load()?.dataset_path,
        };
        check_dataset(&dataset)?;

        let cities = load_cities(&dataset)?;
        println!("{}", summarise_cities(&cities));
        Ok(())
    }
}
