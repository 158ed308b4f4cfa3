//! Engine error types.
//!
//! Defined in `scheinpass-core` so the summary service can classify failures
//! for its isolation policy without string matching: per-student failures are
//! turned into unevaluable entries, registry setup failures abort the run.

use thiserror::Error;

/// Errors produced by the aggregation and evaluation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed grading input, e.g. an exercise grading with neither
    /// `points` nor `sub_exercise_points` set.
    #[error("invalid grading data: {0}")]
    Validation(String),

    /// A criterion instance missing or mistyping parameters its variant
    /// requires.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The same criterion identifier was registered twice. This indicates an
    /// inconsistent rule set and aborts the engine at setup time.
    #[error("configuration error: criterion identifier '{identifier}' registered twice")]
    DuplicateRegistration { identifier: String },

    /// An unresolvable criterion identifier or a missing grading record.
    #[error("not found: {0}")]
    NotFound(String),

    /// A registered criterion variant whose pass/fail formula was never
    /// finished upstream. Fails closed instead of guessing.
    #[error("criterion variant '{0}' has no evaluation rule implemented")]
    NotImplemented(String),
}

impl EngineError {
    /// Returns `true` if this error must abort the whole run rather than
    /// being isolated to a single student's summary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::DuplicateRegistration { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Configuration(format!("invalid criterion parameters: {err}"))
    }
}
