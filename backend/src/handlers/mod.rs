//! HTTP handlers for the Flood Risk Gateway API

pub mod health;
pub mod prediction;
pub mod weather;

pub use health::*;
pub use prediction::*;
pub use weather::*;
