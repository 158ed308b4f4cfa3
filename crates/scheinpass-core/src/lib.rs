//! scheinpass-core — Grading aggregation and criteria evaluation.
//!
//! This crate defines the data model, point aggregation, the pluggable
//! criteria registry, and the summary service that the rest of the
//! scheinpass system builds on.

pub mod aggregate;
pub mod criteria;
pub mod error;
pub mod model;
pub mod points;
pub mod registry;
pub mod summary;
pub mod traits;
