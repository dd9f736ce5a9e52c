//! Business logic services for the Flood Risk Gateway

pub mod prediction;
pub mod weather;

pub use prediction::PredictionDispatcher;
pub use weather::WeatherGateway;
