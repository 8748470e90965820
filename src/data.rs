//! Route profile schema and the city dataset.

pub mod cities;
pub mod route;
pub mod schema;

pub use cities::{load_cities, CityProfile, CityScorer, NeutralScorer};
pub use route::{RainData, RouteAnalysis, RouteRequest};
pub use schema::format_instructions;
