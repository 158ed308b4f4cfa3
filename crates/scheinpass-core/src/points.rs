//! Point aggregation over grading records.
//!
//! Pure functions deriving achieved points from [`ExerciseGrading`] and
//! [`Grading`] values. The upstream system computed these through a getter
//! with a hidden backing field; here the derivation is an explicit function
//! of the full input value, with no internal state.

use crate::error::EngineError;
use crate::model::{ExerciseGrading, Grading};

/// Achieved points of a single graded exercise.
///
/// Non-empty `sub_exercise_points` override the direct `points` field: the
/// result is the sum of all sub-exercise values plus `additional_points`.
/// Without sub-exercise scores the result is `points` plus
/// `additional_points`.
///
/// Fails with [`EngineError::Validation`] when neither `points` nor
/// `sub_exercise_points` is set.
pub fn exercise_points(grading: &ExerciseGrading) -> Result<f64, EngineError> {
    if grading.points.is_none() && grading.sub_exercise_points.is_none() {
        return Err(EngineError::Validation(
            "at least one of 'points' and 'sub_exercise_points' has to be set".into(),
        ));
    }

    let additional = grading.additional_points.unwrap_or(0.0);

    match &grading.sub_exercise_points {
        Some(subs) if !subs.is_empty() => Ok(subs.values().sum::<f64>() + additional),
        _ => Ok(grading.points.unwrap_or(0.0) + additional),
    }
}

/// Total achieved points of a grading: the sum over all exercise entries
/// plus the grading-level `additional_points`.
///
/// The result does not depend on the iteration order of the exercise map;
/// only commutative addition is performed.
pub fn grading_total(grading: &Grading) -> Result<f64, EngineError> {
    let mut sum = grading.additional_points.unwrap_or(0.0);

    for exercise in grading.exercise_gradings.values() {
        sum += exercise_points(exercise)?;
    }

    Ok(sum)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::GradedEntity;

    const EPSILON: f64 = 1e-9;

    fn subs(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    #[test]
    fn direct_points_plus_additional() {
        let grading = ExerciseGrading {
            points: Some(4.0),
            additional_points: Some(1.5),
            ..Default::default()
        };
        assert!((exercise_points(&grading).unwrap() - 5.5).abs() < EPSILON);
    }

    #[test]
    fn points_default_to_zero_with_empty_subs() {
        // Empty sub-exercise map behaves like no sub-exercise scores at all.
        let grading = ExerciseGrading {
            points: None,
            sub_exercise_points: Some(HashMap::new()),
            additional_points: Some(2.0),
            ..Default::default()
        };
        assert!((exercise_points(&grading).unwrap() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn sub_exercise_points_override_direct_points() {
        // Direct points erroneously set to 100 must be ignored entirely.
        let grading = ExerciseGrading {
            points: Some(100.0),
            sub_exercise_points: Some(subs(&[("a", 3.0), ("b", 4.0)])),
            additional_points: Some(1.0),
            ..Default::default()
        };
        assert!((exercise_points(&grading).unwrap() - 8.0).abs() < EPSILON);
    }

    #[test]
    fn neither_points_nor_subs_fails_validation() {
        let grading = ExerciseGrading {
            additional_points: Some(3.0),
            comment: Some("no score".into()),
            ..Default::default()
        };
        assert!(matches!(
            exercise_points(&grading),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn grading_total_sums_exercises_and_additional() {
        let mut grading = Grading::new(GradedEntity::Sheet("sheet-1".into()));
        grading.additional_points = Some(0.5);
        grading.exercise_gradings.insert(
            "ex1".into(),
            ExerciseGrading {
                points: Some(4.0),
                ..Default::default()
            },
        );
        grading.exercise_gradings.insert(
            "ex2".into(),
            ExerciseGrading {
                sub_exercise_points: Some(subs(&[("a", 1.0), ("b", 2.0)])),
                ..Default::default()
            },
        );

        assert!((grading_total(&grading).unwrap() - 7.5).abs() < EPSILON);
    }

    #[test]
    fn grading_total_independent_of_insertion_order() {
        let exercises = [
            ("ex1", 1.25),
            ("ex2", 2.5),
            ("ex3", 0.75),
            ("ex4", 10.0),
            ("ex5", 3.5),
        ];

        let build = |order: &mut dyn Iterator<Item = &(&str, f64)>| {
            let mut grading = Grading::new(GradedEntity::Sheet("sheet-1".into()));
            for (id, points) in order {
                grading.exercise_gradings.insert(
                    id.to_string(),
                    ExerciseGrading {
                        points: Some(*points),
                        ..Default::default()
                    },
                );
            }
            grading
        };

        let forward = build(&mut exercises.iter());
        let backward = build(&mut exercises.iter().rev());

        let a = grading_total(&forward).unwrap();
        let b = grading_total(&backward).unwrap();
        assert!((a - b).abs() < EPSILON, "order changed total: {a} vs {b}");
    }

    #[test]
    fn grading_total_propagates_validation_error() {
        let mut grading = Grading::new(GradedEntity::Exam("exam-1".into()));
        grading
            .exercise_gradings
            .insert("ex1".into(), ExerciseGrading::default());

        assert!(matches!(
            grading_total(&grading),
            Err(EngineError::Validation(_))
        ));
    }
}
