//! External API integrations

pub mod bmkg;
pub mod flood_model;
pub mod openweather;

pub use bmkg::BmkgClient;
pub use flood_model::FloodModelClient;
pub use openweather::OpenWeatherClient;
