//! City dataset loading and rendering.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row of the city dataset.
///
/// Every column is kept as text; absent columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityProfile {
    /// City name.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// Distance from home in kilometres.
    pub distance_km_from_home: String,
    /// Region classification.
    pub region_type: String,
    /// Free-text climate summary.
    pub climate_summary: String,
    /// Dry or humid classification.
    pub climate_dry_or_humid: String,
    /// Hot or cold classification.
    pub climate_hot_or_cold: String,
    /// Average summer temperature in °C.
    pub summer_avg_c: String,
    /// Average winter temperature in °C.
    pub winter_avg_c: String,
    /// Rainy days per year.
    pub rain_days_year: String,
    /// Crime index.
    pub crime_index: String,
    /// Quality-of-life index.
    pub quality_of_life_index: String,
    /// Average internet speed in Mbps.
    pub internet_avg_mbps: String,
    /// Free-text notes.
    pub notes: String,
    /// Data sources.
    pub sources: String,
    /// When the row was collected.
    pub collected_at: String,
}

impl CityProfile {
    /// Creates a profile with only city and state set.
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            ..Self::default()
        }
    }

    /// Renders the `"city, state"` destination label.
    pub fn destination_label(&self) -> String {
        format!("{}, {}", self.city, self.state).trim().to_string()
    }
}

/// Loads the city dataset from a CSV file with a header row.
pub fn load_cities<P: AsRef<Path>>(path: P) -> Result<Vec<CityProfile>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open city dataset: {}", path.display()))?;

    let cities = read_cities(file)
        .with_context(|| format!("Failed to parse city dataset: {}", path.display()))?;

    debug!(path = %path.display(), count = cities.len(), "Loaded city dataset");
    Ok(cities)
}

/// Reads city profiles from any CSV source with a header row.
pub fn read_cities<R: std::io::Read>(reader: R) -> Result<Vec<CityProfile>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    csv_reader
        .deserialize::<CityProfile>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Invalid city record on data row {}", i + 1)))
        .collect()
}

/// Renders the dataset as the human-readable city summary.
pub fn summarise_cities(cities: &[CityProfile]) -> String {
    if cities.is_empty() {
        return "Nenhum perfil de cidade encontrado.".to_string();
    }

    let mut lines = vec!["Perfis de cidades disponíveis:".to_string()];
    lines.extend(cities.iter().map(format_city));
    lines.join("\n")
}

fn format_city(profile: &CityProfile) -> String {
    format!(
        "{}, {} | Distância: {} km | Clima: {} | Notas: {}",
        profile.city,
        profile.state,
        profile.distance_km_from_home,
        profile.climate_summary,
        profile.notes
    )
}

/// Scores a city profile against user-supplied weights.
///
/// No weighting model is defined yet; implementations decide what the
/// weights mean.
pub trait CityScorer {
    /// Returns the score of `profile` under `weights`.
    fn score(&self, profile: &CityProfile, weights: &HashMap<String, f64>) -> f64;
}

/// Scorer that rates every city `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralScorer;

impl CityScorer for NeutralScorer {
    fn score(&self, _profile: &CityProfile, _weights: &HashMap<String, f64>) -> f64 {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const DATASET: &str = "\
city,state,distance_km_from_home,region_type,climate_summary,notes
Criciúma,SC,0,serra-litoral,Subtropical úmido,Casa
Florianópolis,SC,190,litoral,\"Quente, úmido\",Ilha
";

    #[test]
    fn reads_rows_and_defaults_missing_columns() {
        let cities = read_cities(DATASET.as_bytes()).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].city, "Criciúma");
        assert_eq!(cities[1].climate_summary, "Quente, úmido");
        assert_eq!(cities[1].collected_at, "");
        assert_eq!(cities[1].internet_avg_mbps, "");
    }

    #[test]
    fn load_cities_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cidades.csv");
        std::fs::write(&path, DATASET).unwrap();

        let cities = load_cities(&path).unwrap();
        assert_eq!(cities[1].destination_label(), "Florianópolis, SC");
    }

    #[test]
    fn load_cities_missing_file_names_path() {
        let err = load_cities("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn destination_label_trims() {
        assert_eq!(CityProfile::new(" Lages", "SC ").destination_label(), "Lages, SC");
        assert_eq!(CityProfile::new("Lages", "").destination_label(), "Lages,");
    }

    #[test]
    fn summary_lists_each_city() {
        let cities = read_cities(DATASET.as_bytes()).unwrap();
        let summary = summarise_cities(&cities);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines[0], "Perfis de cidades disponíveis:");
        assert_eq!(
            lines[2],
            "Florianópolis, SC | Distância: 190 km | Clima: Quente, úmido | Notas: Ilha"
        );
    }

    #[test]
    fn summary_of_empty_dataset() {
        assert_eq!(summarise_cities(&[]), "Nenhum perfil de cidade encontrado.");
    }

    #[test]
    fn neutral_scorer_is_zero() {
        let weights = HashMap::from([("climate".to_string(), 2.0)]);
        let score = NeutralScorer.score(&CityProfile::new("Lages", "SC"), &weights);
        assert!(score.abs() < f64::EPSILON);
    }
}
