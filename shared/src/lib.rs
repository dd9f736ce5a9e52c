//! Shared types and models for the Flood Risk Gateway
//!
//! This crate holds the pure part of the pipeline: the domain types exchanged
//! with clients and upstream providers, and the matching, scoring, fusion and
//! fallback rules that operate on them. Nothing in here performs I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
