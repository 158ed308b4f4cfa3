//! Core data model types for scheinpass.
//!
//! These are the fundamental types the engine computes over: grading records
//! for sheets and exams, criterion configurations, and the minimal course
//! shape the aggregate builder needs. The engine borrows read-only snapshots
//! of these for the duration of one evaluation run; it never mutates stored
//! records.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The scored portion of a [`Grading`] attributable to one exercise.
///
/// Sub-exercise scores override the direct `points` field entirely: once
/// `sub_exercise_points` is present and non-empty, the effective value is the
/// sum of its values plus `additional_points`, and `points` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseGrading {
    /// Directly assigned points for the whole exercise.
    #[serde(default)]
    pub points: Option<f64>,
    /// Points per sub-exercise id. Overrides `points` when non-empty.
    #[serde(default)]
    pub sub_exercise_points: Option<HashMap<String, f64>>,
    /// Bonus points on top of the exercise score.
    #[serde(default)]
    pub additional_points: Option<f64>,
    /// Free-text note from the corrector.
    #[serde(default)]
    pub comment: Option<String>,
}

impl ExerciseGrading {
    /// Points for a single sub-exercise, if sub-exercise scores exist.
    pub fn sub_exercise_grading(&self, sub_exercise_id: &str) -> Option<f64> {
        self.sub_exercise_points
            .as_ref()
            .and_then(|subs| subs.get(sub_exercise_id).copied())
    }
}

/// Discriminated reference to the scored unit a grading belongs to.
///
/// The upstream record kept two optional id fields with the invariant
/// "exactly one set"; the enum makes that invariant structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum GradedEntity {
    /// An exercise sheet.
    Sheet(String),
    /// A Schein exam.
    Exam(String),
}

impl GradedEntity {
    /// The id of the referenced sheet or exam.
    pub fn id(&self) -> &str {
        match self {
            GradedEntity::Sheet(id) | GradedEntity::Exam(id) => id,
        }
    }
}

impl fmt::Display for GradedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradedEntity::Sheet(id) => write!(f, "sheet {id}"),
            GradedEntity::Exam(id) => write!(f, "exam {id}"),
        }
    }
}

/// One scored unit (a sheet or an exam) for one student or team.
///
/// Team grading: several students reference the same grading. Membership can
/// be adjusted without touching point data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grading {
    /// The sheet or exam this grading scores.
    pub entity: GradedEntity,
    /// Per-exercise scores keyed by exercise id.
    #[serde(default)]
    pub exercise_gradings: HashMap<String, ExerciseGrading>,
    /// Bonus points on top of all exercise scores.
    #[serde(default)]
    pub additional_points: Option<f64>,
    /// Free-text note from the corrector.
    #[serde(default)]
    pub comment: Option<String>,
    /// Ids of the students sharing this grading.
    #[serde(default)]
    pub students: Vec<String>,
}

impl Grading {
    /// Creates an empty grading for the given entity.
    pub fn new(entity: GradedEntity) -> Self {
        Self {
            entity,
            exercise_gradings: HashMap::new(),
            additional_points: None,
            comment: None,
            students: Vec::new(),
        }
    }

    /// Adds a student to this grading. No-op if already a member.
    pub fn add_student(&mut self, student_id: &str) {
        if !self.students.iter().any(|s| s == student_id) {
            self.students.push(student_id.to_string());
        }
    }

    /// Removes a student from this grading. No-op if not a member.
    pub fn remove_student(&mut self, student_id: &str) {
        self.students.retain(|s| s != student_id);
    }

    /// The grading for one exercise, if any.
    pub fn exercise_grading(&self, exercise_id: &str) -> Option<&ExerciseGrading> {
        self.exercise_gradings.get(exercise_id)
    }
}

/// A configured pass/fail rule.
///
/// The `identifier` selects the registered rule variant; `params` is opaque
/// to the engine and deserialized by the rule itself. Criteria are configured
/// once per course and evaluated repeatedly; evaluation never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    /// Unique id of this criterion instance.
    pub id: String,
    /// Rule variant selector, e.g. "attendance".
    pub identifier: String,
    /// Variant-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Minimal shape of a sheet or exam the aggregate builder needs: its id and
/// the maximum achievable points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub possible_points: f64,
}

/// Course-level facts for one evaluation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseInfo {
    /// All exercise sheets of the course.
    #[serde(default)]
    pub sheets: Vec<EntityInfo>,
    /// All Schein exams of the course.
    #[serde(default)]
    pub exams: Vec<EntityInfo>,
}

/// Attended vs. held tutorial sessions for one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTally {
    pub attended: u32,
    pub total: u32,
}

/// A single violation found by the boundary validation functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates an exercise grading before it enters the engine.
///
/// Checks the construction invariant (at least one of `points` /
/// `sub_exercise_points` must be supplied) and rejects negative values.
pub fn validate_exercise_grading(grading: &ExerciseGrading) -> Vec<Violation> {
    let mut violations = Vec::new();

    if grading.points.is_none() && grading.sub_exercise_points.is_none() {
        violations.push(Violation::new(
            "points",
            "at least one of 'points' and 'sub_exercise_points' has to be set",
        ));
    }

    if let Some(points) = grading.points {
        if points < 0.0 {
            violations.push(Violation::new("points", "points must not be negative"));
        }
    }

    if let Some(subs) = &grading.sub_exercise_points {
        for (sub_id, value) in subs {
            if *value < 0.0 {
                violations.push(Violation::new(
                    format!("sub_exercise_points.{sub_id}"),
                    "sub-exercise points must not be negative",
                ));
            }
        }
    }

    if let Some(additional) = grading.additional_points {
        if additional < 0.0 {
            violations.push(Violation::new(
                "additional_points",
                "additional points must not be negative",
            ));
        }
    }

    violations
}

/// Validates a whole grading record, including every exercise grading.
pub fn validate_grading(grading: &Grading) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(additional) = grading.additional_points {
        if additional < 0.0 {
            violations.push(Violation::new(
                "additional_points",
                "additional points must not be negative",
            ));
        }
    }

    for (exercise_id, exercise) in &grading.exercise_gradings {
        for v in validate_exercise_grading(exercise) {
            violations.push(Violation::new(
                format!("exercise_gradings.{exercise_id}.{}", v.field),
                v.message,
            ));
        }
    }

    violations
}

/// Shape-level validation of a criterion instance. Parameter checks specific
/// to the variant belong to the registered rule's `validate`.
pub fn validate_criterion(criterion: &Criterion) -> Vec<Violation> {
    let mut violations = Vec::new();

    if criterion.id.trim().is_empty() {
        violations.push(Violation::new("id", "criterion id must not be empty"));
    }
    if criterion.identifier.trim().is_empty() {
        violations.push(Violation::new(
            "identifier",
            "criterion identifier must not be empty",
        ));
    }

    violations
}
