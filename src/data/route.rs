//! Route profile schema.

use schemars::JsonSchema;
use serde::Serialize;

use crate::llm::error::ValidationError;

/// Number of entries every climate summary carries.
pub const CLIMATE_SUMMARY_POINTS: usize = 3;

/// Rainy-day count for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[schemars(description = "Informações de chuva para um determinado ano.")]
pub struct RainData {
    /// Year the rainy-day count refers to.
    #[schemars(description = "Ano da medição de dias chuvosos.")]
    year: i32,
    /// Number of rainy days in that year.
    #[schemars(description = "Quantidade de dias chuvosos no ano informado.")]
    days: u32,
}

impl RainData {
    /// Creates a rain record.
    pub fn new(year: i32, days: u32) -> Self {
        Self { year, days }
    }

    /// Year of the measurement.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Rainy days in [`year`](Self::year).
    pub fn days(&self) -> u32 {
        self.days
    }
}

/// Structured route profile between an origin and a destination.
///
/// Values only come into existence through validation, either
/// [`RouteAnalysis::new`] or the response parser, and expose read-only
/// accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[schemars(description = "Estrutura do JSON retornado pelo modelo para a análise de rota.")]
pub struct RouteAnalysis {
    /// Approximate distance between origin and destination in kilometres.
    #[schemars(
        range(min = 0),
        description = "Distância aproximada entre origem e destino em quilômetros."
    )]
    distance_km_from_home: f64,
    /// Short description of the destination's region type (coast, highlands, ...).
    #[schemars(
        description = "Descrição sucinta do tipo de região do destino (praia, serra etc.)."
    )]
    region_type: String,
    /// Three short points summarising the destination's typical climate.
    #[schemars(description = "Três tópicos curtos resumindo o clima típico do destino.")]
    climate_summary: [String; CLIMATE_SUMMARY_POINTS],
    /// Rainy-day record with the year used as reference.
    #[schemars(
        description = "Registro de dias chuvosos com o ano utilizado como referência."
    )]
    rain_days_year: RainData,
}

impl RouteAnalysis {
    /// Builds a route profile, rejecting a negative or non-finite distance.
    pub fn new(
        distance_km_from_home: f64,
        region_type: impl Into<String>,
        climate_summary: [String; CLIMATE_SUMMARY_POINTS],
        rain_days_year: RainData,
    ) -> Result<Self, ValidationError> {
        if !distance_km_from_home.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "distance_km_from_home".to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        if distance_km_from_home < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "distance_km_from_home".to_string(),
                reason: format!("must be non-negative, got {distance_km_from_home}"),
            });
        }

        Ok(Self {
            distance_km_from_home,
            region_type: region_type.into(),
            climate_summary,
            rain_days_year,
        })
    }

    /// Estimated distance in kilometres.
    pub fn distance_km_from_home(&self) -> f64 {
        self.distance_km_from_home
    }

    /// Region classification of the destination.
    pub fn region_type(&self) -> &str {
        &self.region_type
    }

    /// The three climate points, in the order the model produced them.
    pub fn climate_summary(&self) -> &[String; CLIMATE_SUMMARY_POINTS] {
        &self.climate_summary
    }

    /// Rainy-day record.
    pub fn rain_days_year(&self) -> &RainData {
        &self.rain_days_year
    }

    /// Renders the profile as pretty JSON with two-space indentation.
    ///
    /// Non-ASCII characters are written as-is.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl TryFrom<serde_json::Value> for RouteAnalysis {
    type Error = ValidationError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        crate::llm::parser::route_analysis_from_value(&value)
    }
}

/// One origin/destination pair to profile.
///
/// City names are case-sensitive and passed to the prompt unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteRequest {
    /// Origin city.
    pub origin: String,
    /// Destination city.
    pub destination: String,
}

impl RouteRequest {
    /// Creates a request pair.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn summary() -> [String; 3] {
        [
            "Verões quentes".to_string(),
            "Invernos amenos".to_string(),
            "Chuva bem distribuída".to_string(),
        ]
    }

    #[test]
    fn new_rejects_negative_distance() {
        let err = RouteAnalysis::new(-1.0, "litoral", summary(), RainData::new(2023, 120))
            .unwrap_err();
        assert_eq!(err.field(), Some("distance_km_from_home"));
    }

    #[test]
    fn new_rejects_nan_distance() {
        assert!(RouteAnalysis::new(f64::NAN, "litoral", summary(), RainData::new(2023, 1)).is_err());
    }

    #[test]
    fn pretty_json_keeps_field_names_and_accents() {
        let analysis =
            RouteAnalysis::new(290.5, "litoral", summary(), RainData::new(2023, 140)).unwrap();
        let json = analysis.to_pretty_json().unwrap();

        assert!(json.contains("\n  \"distance_km_from_home\": 290.5"));
        assert!(json.contains("\"region_type\": \"litoral\""));
        assert!(json.contains("Verões quentes"));
        assert!(json.contains("\"rain_days_year\": {\n    \"year\": 2023,\n    \"days\": 140\n  }"));
    }

    #[test]
    fn try_from_value_goes_through_validation() {
        let ok = RouteAnalysis::try_from(serde_json::json!({
            "distance_km_from_home": 10,
            "region_type": "serra",
            "climate_summary": ["a", "b", "c"],
            "rain_days_year": {"year": 2022, "days": 100}
        }))
        .unwrap();
        assert_eq!(ok.rain_days_year().days(), 100);

        let short = RouteAnalysis::try_from(serde_json::json!({
            "distance_km_from_home": 10,
            "region_type": "serra",
            "climate_summary": ["a", "b"],
            "rain_days_year": {"year": 2022, "days": 100}
        }));
        assert!(short.is_err());
    }
}
