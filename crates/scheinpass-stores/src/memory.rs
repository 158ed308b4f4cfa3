//! In-memory store backend.
//!
//! One seeded, immutable store implementing all four engine store traits.
//! Backs the CLI after a course file is loaded and serves as the test
//! double for the engine.

use std::collections::HashMap;

use async_trait::async_trait;

use scheinpass_core::error::EngineError;
use scheinpass_core::model::{AttendanceTally, Criterion, GradedEntity, Grading};
use scheinpass_core::traits::{
    AttendanceStore, CriteriaConfigStore, GradingStore, PresentationStore,
};

/// Immutable in-memory snapshot of one course's records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseStore {
    gradings: Vec<Grading>,
    criteria: Vec<Criterion>,
    tallies: HashMap<String, AttendanceTally>,
    presentation: HashMap<String, f64>,
}

impl InMemoryCourseStore {
    pub fn new(
        gradings: Vec<Grading>,
        criteria: Vec<Criterion>,
        tallies: HashMap<String, AttendanceTally>,
        presentation: HashMap<String, f64>,
    ) -> Self {
        Self {
            gradings,
            criteria,
            tallies,
            presentation,
        }
    }

    pub fn gradings(&self) -> &[Grading] {
        &self.gradings
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
}

#[async_trait]
impl GradingStore for InMemoryCourseStore {
    async fn grading_for(
        &self,
        student_id: &str,
        entity: &GradedEntity,
    ) -> Result<Grading, EngineError> {
        self.gradings
            .iter()
            .find(|g| &g.entity == entity && g.students.iter().any(|s| s == student_id))
            .cloned()
            .ok_or_else(|| {
                EngineError::NotFound(format!("no grading of student '{student_id}' for {entity}"))
            })
    }

    async fn all_gradings_for(
        &self,
        cohort: &[String],
        entity: &GradedEntity,
    ) -> Result<Vec<Grading>, EngineError> {
        Ok(self
            .gradings
            .iter()
            .filter(|g| &g.entity == entity)
            .filter(|g| g.students.iter().any(|s| cohort.contains(s)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CriteriaConfigStore for InMemoryCourseStore {
    async fn all_criteria(&self) -> Result<Vec<Criterion>, EngineError> {
        Ok(self.criteria.clone())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryCourseStore {
    async fn attendance_tallies(
        &self,
        cohort: &[String],
    ) -> Result<HashMap<String, AttendanceTally>, EngineError> {
        Ok(self
            .tallies
            .iter()
            .filter(|(id, _)| cohort.contains(id))
            .map(|(id, tally)| (id.clone(), *tally))
            .collect())
    }
}

#[async_trait]
impl PresentationStore for InMemoryCourseStore {
    async fn presentation_points(
        &self,
        cohort: &[String],
    ) -> Result<HashMap<String, f64>, EngineError> {
        Ok(self
            .presentation
            .iter()
            .filter(|(id, _)| cohort.contains(id))
            .map(|(id, points)| (id.clone(), *points))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use scheinpass_core::model::ExerciseGrading;

    use super::*;

    fn store() -> InMemoryCourseStore {
        let mut grading = Grading::new(GradedEntity::Sheet("sheet-1".into()));
        grading.add_student("alice");
        grading.add_student("bob");
        grading.exercise_gradings.insert(
            "ex1".into(),
            ExerciseGrading {
                points: Some(5.0),
                ..Default::default()
            },
        );

        InMemoryCourseStore::new(
            vec![grading],
            vec![],
            HashMap::from([(
                "alice".to_string(),
                AttendanceTally {
                    attended: 7,
                    total: 10,
                },
            )]),
            HashMap::from([("alice".to_string(), 3.0)]),
        )
    }

    #[tokio::test]
    async fn grading_for_finds_team_grading() {
        let store = store();
        let entity = GradedEntity::Sheet("sheet-1".into());

        let grading = store.grading_for("bob", &entity).await.unwrap();
        assert_eq!(grading.students.len(), 2);

        let missing = store.grading_for("carol", &entity).await;
        assert!(matches!(missing, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn all_gradings_filters_by_cohort() {
        let store = store();
        let entity = GradedEntity::Sheet("sheet-1".into());

        let hits = store
            .all_gradings_for(&["alice".to_string()], &entity)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = store
            .all_gradings_for(&["carol".to_string()], &entity)
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn tallies_restricted_to_cohort() {
        let store = store();
        let tallies = store
            .attendance_tallies(&["alice".to_string(), "dave".to_string()])
            .await
            .unwrap();
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies["alice"].attended, 7);
    }
}
