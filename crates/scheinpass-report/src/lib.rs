//! scheinpass-report — Rendering of summary results.
//!
//! Consumes the summary output contract of `scheinpass-core` as opaque data;
//! nothing here knows how verdicts were computed.

pub mod json;
pub mod markdown;

pub use json::{load_cohort_json, save_cohort_json};
pub use markdown::{cohort_markdown, student_summary_markdown};
