//! Domain models for the Flood Risk Gateway

mod history;
mod prediction;
mod regional;
mod weather;

pub use history::*;
pub use prediction::*;
pub use regional::*;
pub use weather::*;
