//! TOML course-file loader.
//!
//! Parses a whole course (sheets, exams, students, criteria, gradings) from
//! one TOML file, runs the boundary validation functions over the raw
//! records, and only then constructs domain values and a seeded
//! [`InMemoryCourseStore`]. The raw records deliberately mirror the wire
//! shape (optional `sheet` / `exam` id fields); the "exactly one set"
//! invariant is checked here and becomes structural in the domain model.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use scheinpass_core::model::{
    validate_criterion, validate_grading, AttendanceTally, CourseInfo, Criterion, EntityInfo,
    ExerciseGrading, GradedEntity, Grading, Violation,
};

use crate::memory::InMemoryCourseStore;

/// Raw, unvalidated course file contents.
#[derive(Debug, Deserialize)]
pub struct CourseFile {
    pub course: RawCourse,
    #[serde(default)]
    pub students: Vec<RawStudent>,
    #[serde(default)]
    pub criteria: Vec<RawCriterion>,
    #[serde(default)]
    pub gradings: Vec<RawGrading>,
}

#[derive(Debug, Deserialize)]
pub struct RawCourse {
    pub name: String,
    #[serde(default)]
    pub sheets: Vec<RawEntity>,
    #[serde(default)]
    pub exams: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
pub struct RawEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub possible_points: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawStudent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attended_sessions: u32,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub presentation_points: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawCriterion {
    pub id: String,
    pub identifier: String,
    #[serde(default = "default_params")]
    pub params: toml::Value,
}

fn default_params() -> toml::Value {
    toml::Value::Table(toml::value::Table::new())
}

#[derive(Debug, Deserialize)]
pub struct RawGrading {
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub additional_points: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub exercises: HashMap<String, RawExerciseGrading>,
}

#[derive(Debug, Deserialize)]
pub struct RawExerciseGrading {
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub sub_exercise_points: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub additional_points: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Everything a summary run needs, built from one course file.
#[derive(Debug)]
pub struct CourseData {
    pub name: String,
    pub course: CourseInfo,
    /// All student ids, in file order.
    pub cohort: Vec<String>,
    /// Display names keyed by student id.
    pub student_names: HashMap<String, String>,
    pub store: InMemoryCourseStore,
}

/// Parses a course file from disk.
pub fn parse_course(path: &Path) -> Result<CourseFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;
    parse_course_str(&content, path)
}

/// Parses a course file from a string (useful for testing).
pub fn parse_course_str(content: &str, source_path: &Path) -> Result<CourseFile> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse course file: {}", source_path.display()))
}

/// Parses, validates, and converts a course file in one step.
///
/// Fails when the file contains any violation; use [`CourseFile::validate`]
/// to list violations without aborting.
pub fn load_course(path: &Path) -> Result<CourseData> {
    let file = parse_course(path)?;

    let violations = file.validate();
    if !violations.is_empty() {
        let listed: Vec<String> = violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        anyhow::bail!(
            "course file {} has {} violation(s):\n  {}",
            path.display(),
            violations.len(),
            listed.join("\n  ")
        );
    }

    let data = file.into_course_data()?;
    tracing::debug!(
        course = %data.name,
        students = data.cohort.len(),
        "loaded course file"
    );
    Ok(data)
}

impl CourseFile {
    /// Validates the raw records without constructing domain values.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        let known_students: Vec<&str> = self.students.iter().map(|s| s.id.as_str()).collect();
        let sheet_ids: Vec<&str> = self.course.sheets.iter().map(|s| s.id.as_str()).collect();
        let exam_ids: Vec<&str> = self.course.exams.iter().map(|e| e.id.as_str()).collect();

        for (idx, student) in self.students.iter().enumerate() {
            let path = format!("students[{idx}]");
            if known_students
                .iter()
                .filter(|id| **id == student.id)
                .count()
                > 1
            {
                violations.push(violation(&path, "duplicate student id"));
            }
            if student.attended_sessions > student.total_sessions {
                violations.push(violation(
                    &format!("{path}.attended_sessions"),
                    "attended sessions exceed held sessions",
                ));
            }
        }

        for (idx, criterion) in self.criteria.iter().enumerate() {
            let path = format!("criteria[{idx}]");
            match criterion.to_domain() {
                Ok(domain) => {
                    for v in validate_criterion(&domain) {
                        violations.push(violation(&format!("{path}.{}", v.field), &v.message));
                    }
                }
                Err(e) => violations.push(violation(&format!("{path}.params"), &e.to_string())),
            }
        }

        for (idx, grading) in self.gradings.iter().enumerate() {
            let path = format!("gradings[{idx}]");

            match (&grading.sheet, &grading.exam) {
                (Some(_), Some(_)) => {
                    violations.push(violation(
                        &path,
                        "exactly one of 'sheet' and 'exam' has to be set, found both",
                    ));
                    continue;
                }
                (None, None) => {
                    violations.push(violation(
                        &path,
                        "exactly one of 'sheet' and 'exam' has to be set, found neither",
                    ));
                    continue;
                }
                (Some(sheet), None) if !sheet_ids.contains(&sheet.as_str()) => {
                    violations.push(violation(&format!("{path}.sheet"), "unknown sheet id"));
                }
                (None, Some(exam)) if !exam_ids.contains(&exam.as_str()) => {
                    violations.push(violation(&format!("{path}.exam"), "unknown exam id"));
                }
                _ => {}
            }

            if grading.students.is_empty() {
                violations.push(violation(
                    &format!("{path}.students"),
                    "a grading must belong to at least one student",
                ));
            }
            for student_id in &grading.students {
                if !known_students.contains(&student_id.as_str()) {
                    violations.push(violation(
                        &format!("{path}.students"),
                        &format!("unknown student id '{student_id}'"),
                    ));
                }
            }

            for v in validate_grading(&grading.to_domain()) {
                violations.push(violation(&format!("{path}.{}", v.field), &v.message));
            }
        }

        violations
    }

    /// Converts the validated file into domain values and a seeded store.
    pub fn into_course_data(self) -> Result<CourseData> {
        let course = CourseInfo {
            sheets: self.course.sheets.iter().map(RawEntity::to_domain).collect(),
            exams: self.course.exams.iter().map(RawEntity::to_domain).collect(),
        };

        let cohort: Vec<String> = self.students.iter().map(|s| s.id.clone()).collect();
        let student_names: HashMap<String, String> = self
            .students
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();

        let tallies: HashMap<String, AttendanceTally> = self
            .students
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    AttendanceTally {
                        attended: s.attended_sessions,
                        total: s.total_sessions,
                    },
                )
            })
            .collect();

        let presentation: HashMap<String, f64> = self
            .students
            .iter()
            .map(|s| (s.id.clone(), s.presentation_points))
            .collect();

        let criteria: Vec<Criterion> = self
            .criteria
            .iter()
            .map(|c| c.to_domain())
            .collect::<Result<_>>()?;

        let gradings: Vec<Grading> = self.gradings.iter().map(RawGrading::to_domain).collect();

        Ok(CourseData {
            name: self.course.name,
            course,
            cohort,
            student_names,
            store: InMemoryCourseStore::new(gradings, criteria, tallies, presentation),
        })
    }
}

impl RawEntity {
    fn to_domain(&self) -> EntityInfo {
        EntityInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            possible_points: self.possible_points,
        }
    }
}

impl RawCriterion {
    fn to_domain(&self) -> Result<Criterion> {
        // TOML params become the opaque JSON the rules deserialize.
        let params = serde_json::to_value(&self.params)
            .with_context(|| format!("criterion '{}' has unconvertible params", self.id))?;
        Ok(Criterion {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            params,
        })
    }
}

impl RawGrading {
    fn to_domain(&self) -> Grading {
        let entity = match (&self.sheet, &self.exam) {
            (Some(sheet), _) => GradedEntity::Sheet(sheet.clone()),
            (_, Some(exam)) => GradedEntity::Exam(exam.clone()),
            // validate() rejects this shape before conversion; an empty id
            // keeps conversion total for the violation listing itself.
            (None, None) => GradedEntity::Sheet(String::new()),
        };

        let mut grading = Grading::new(entity);
        grading.additional_points = self.additional_points;
        grading.comment = self.comment.clone();
        grading.students = self.students.clone();
        grading.exercise_gradings = self
            .exercises
            .iter()
            .map(|(id, ex)| {
                (
                    id.clone(),
                    ExerciseGrading {
                        points: ex.points,
                        sub_exercise_points: ex.sub_exercise_points.clone(),
                        additional_points: ex.additional_points,
                        comment: ex.comment.clone(),
                    },
                )
            })
            .collect();
        grading
    }
}

fn violation(field: &str, message: &str) -> Violation {
    Violation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
