//! Store traits the engine consumes its source data through.
//!
//! These async traits are implemented by the `scheinpass-stores` crate. The
//! engine borrows read-only snapshots through them once per run, ahead of
//! computation; fetching is the only suspension point of a summary run.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::model::{AttendanceTally, Criterion, GradedEntity, Grading};

/// Source of grading records.
#[async_trait]
pub trait GradingStore: Send + Sync {
    /// The grading of one student for one sheet or exam.
    ///
    /// Fails with [`EngineError::NotFound`] when no grading exists.
    async fn grading_for(
        &self,
        student_id: &str,
        entity: &GradedEntity,
    ) -> Result<Grading, EngineError>;

    /// All gradings any cohort member holds for one sheet or exam, in one
    /// batched round trip. Team gradings appear once, listing every member.
    async fn all_gradings_for(
        &self,
        cohort: &[String],
        entity: &GradedEntity,
    ) -> Result<Vec<Grading>, EngineError>;
}

/// Source of the configured criteria of a course.
#[async_trait]
pub trait CriteriaConfigStore: Send + Sync {
    async fn all_criteria(&self) -> Result<Vec<Criterion>, EngineError>;
}

/// Source of attendance tallies.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Attended vs. held sessions per cohort member. Students without
    /// records may be absent from the map; they count as zero attendance.
    /// A tally with `attended > total` marks the student unevaluable.
    async fn attendance_tallies(
        &self,
        cohort: &[String],
    ) -> Result<HashMap<String, AttendanceTally>, EngineError>;
}

/// Source of presentation points.
#[async_trait]
pub trait PresentationStore: Send + Sync {
    /// Total presentation points per cohort member. Absent students count
    /// as zero points.
    async fn presentation_points(
        &self,
        cohort: &[String],
    ) -> Result<HashMap<String, f64>, EngineError>;
}
