//! Per-student aggregate built fresh for one evaluation run.
//!
//! A [`StudentAggregate`] is a derived, read-only view over a student's
//! gradings, attendance tally, and presentation points. It is never
//! persisted; every summary run rebuilds it from scratch.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{AttendanceTally, CourseInfo, GradedEntity, Grading};
use crate::points::grading_total;

/// Achieved vs. achievable points over a set of graded entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTally {
    pub achieved: f64,
    pub possible: f64,
}

/// The numeric view of one student that criterion rules evaluate against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAggregate {
    pub student_id: String,
    /// Points over all exercise sheets.
    pub sheet_points: PointTally,
    /// Points over all Schein exams.
    pub exam_points: PointTally,
    /// Attended vs. held tutorial sessions.
    pub attendance: AttendanceTally,
    /// Total presentation points.
    pub presentation_points: f64,
}

impl StudentAggregate {
    /// Builds the aggregate for one student from the raw inputs of a run.
    ///
    /// `gradings` must already be filtered to this student; team gradings
    /// count in full for every member. Fails with
    /// [`EngineError::Validation`] when any grading record is malformed or
    /// the attendance tally claims more attended than held sessions.
    pub fn collect(
        student_id: &str,
        gradings: &[Grading],
        course: &CourseInfo,
        attendance: AttendanceTally,
        presentation_points: f64,
    ) -> Result<Self, EngineError> {
        if attendance.attended > attendance.total {
            return Err(EngineError::Validation(format!(
                "attended sessions ({}) exceed held sessions ({})",
                attendance.attended, attendance.total
            )));
        }

        let mut sheet_achieved = 0.0;
        let mut exam_achieved = 0.0;

        for grading in gradings {
            let total = grading_total(grading)?;
            match grading.entity {
                GradedEntity::Sheet(_) => sheet_achieved += total,
                GradedEntity::Exam(_) => exam_achieved += total,
            }
        }

        let sheet_possible: f64 = course.sheets.iter().map(|s| s.possible_points).sum();
        let exam_possible: f64 = course.exams.iter().map(|e| e.possible_points).sum();

        Ok(Self {
            student_id: student_id.to_string(),
            sheet_points: PointTally {
                achieved: sheet_achieved,
                possible: sheet_possible,
            },
            exam_points: PointTally {
                achieved: exam_achieved,
                possible: exam_possible,
            },
            attendance,
            presentation_points,
        })
    }
}
