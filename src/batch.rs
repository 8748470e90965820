//! Batch route profiling over the city dataset.
//!
//! Builds one request per destination relative to a fixed origin, runs them
//! through the pipeline in a single batch and pairs each profile with its
//! destination by position.

use anyhow::{ensure, Result};
use tracing::info;

use crate::data::cities::CityProfile;
use crate::data::route::{RouteAnalysis, RouteRequest};
use crate::llm::pipeline::RoutePipeline;

/// A destination label paired with its profile.
pub type ProfiledRoute = (String, RouteAnalysis);

/// Returns the `"city, state"` labels of every city except the origin.
///
/// A row is dropped when its trimmed city equals the trimmed origin,
/// ignoring case.
pub fn destinations(cities: &[CityProfile], origin: &str) -> Vec<String> {
    let origin_key = origin.trim().to_lowercase();

    cities
        .iter()
        .filter(|profile| profile.city.trim().to_lowercase() != origin_key)
        .map(CityProfile::destination_label)
        .collect()
}

/// Pairs every destination with `origin`.
pub fn build_requests(origin: &str, destinations: &[String]) -> Vec<RouteRequest> {
    destinations
        .iter()
        .map(|destination| RouteRequest::new(origin, destination.as_str()))
        .collect()
}

/// Profiles every destination in one batch; the first failure aborts it.
pub async fn run_batch(
    pipeline: &RoutePipeline,
    cities: &[CityProfile],
    origin: &str,
) -> Result<Vec<ProfiledRoute>> {
    let destinations = destinations(cities, origin);
    let requests = build_requests(origin, &destinations);

    info!(
        origin = %origin,
        requests = requests.len(),
        "Running route profile batch"
    );

    let analyses = pipeline.invoke_many(&requests).await?;
    ensure!(
        analyses.len() == destinations.len(),
        "pipeline returned {} profiles for {} destinations",
        analyses.len(),
        destinations.len()
    );

    Ok(destinations.into_iter().zip(analyses).collect())
}

/// Profiles every destination, keeping a separate result per destination.
pub async fn run_batch_each(
    pipeline: &RoutePipeline,
    cities: &[CityProfile],
    origin: &str,
) -> Vec<(String, Result<RouteAnalysis>)> {
    let destinations = destinations(cities, origin);
    let requests = build_requests(origin, &destinations);

    info!(
        origin = %origin,
        requests = requests.len(),
        "Running route profile batch (per-item results)"
    );

    let results = pipeline.invoke_each(&requests).await;
    destinations.into_iter().zip(results).collect()
}
