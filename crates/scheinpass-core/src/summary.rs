//! Summary service: per-student and per-cohort pass/fail verdicts.
//!
//! Orchestrates one evaluation run: batched fetching of source data, fresh
//! aggregate construction per student, criterion evaluation, and the fan-out
//! across a cohort on spawned tasks. Every run recomputes from scratch;
//! callers needing caching layer it externally.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::aggregate::StudentAggregate;
use crate::criteria::{CriteriaEvaluator, CriterionSummary};
use crate::error::EngineError;
use crate::model::{AttendanceTally, CourseInfo, Criterion, GradedEntity, Grading};
use crate::registry::CriteriaRegistry;
use crate::traits::{AttendanceStore, CriteriaConfigStore, GradingStore, PresentationStore};

/// Configuration for the summary service.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Maximum number of students evaluated concurrently.
    pub parallelism: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// The computed verdict for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub student_id: String,
    /// Logical AND over all criterion verdicts. A student with zero
    /// configured criteria trivially passes.
    pub overall_passed: bool,
    pub criteria: Vec<CriterionSummary>,
}

/// A cohort entry: either a full verdict or the reason the student could
/// not be evaluated. Never silently reported as pass or fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummaryOutcome {
    Evaluated(StudentSummary),
    Unevaluable { reason: String },
}

/// The result of one cohort run. Entries carry no ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummary {
    /// Unique id of this run.
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// One entry per cohort member, keyed by student id.
    pub entries: HashMap<String, SummaryOutcome>,
    pub duration_ms: u64,
}

impl CohortSummary {
    pub fn passed_count(&self) -> usize {
        self.entries
            .values()
            .filter(|o| matches!(o, SummaryOutcome::Evaluated(s) if s.overall_passed))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .values()
            .filter(|o| matches!(o, SummaryOutcome::Evaluated(s) if !s.overall_passed))
            .count()
    }

    pub fn unevaluable_count(&self) -> usize {
        self.entries
            .values()
            .filter(|o| matches!(o, SummaryOutcome::Unevaluable { .. }))
            .count()
    }
}

/// The external stores one cohort run reads from.
pub struct CohortStores<'a> {
    pub gradings: &'a dyn GradingStore,
    pub criteria: &'a dyn CriteriaConfigStore,
    pub attendance: &'a dyn AttendanceStore,
    pub presentations: &'a dyn PresentationStore,
}

/// Evaluates all configured criteria for single students and whole cohorts.
pub struct SummaryService {
    registry: Arc<CriteriaRegistry>,
    config: SummaryConfig,
}

impl SummaryService {
    pub fn new(registry: Arc<CriteriaRegistry>, config: SummaryConfig) -> Self {
        Self { registry, config }
    }

    /// Computes one student's summary from already-fetched inputs.
    ///
    /// Builds a fresh [`StudentAggregate`] from the student's gradings,
    /// attendance tally, and presentation points, then evaluates every
    /// criterion. Pure computation; any error refers to this student's data
    /// or to one criterion instance.
    pub fn summarize_student(
        &self,
        student_id: &str,
        gradings: &[Grading],
        course: &CourseInfo,
        attendance: AttendanceTally,
        presentation_points: f64,
        criteria: &[Criterion],
    ) -> Result<StudentSummary, EngineError> {
        evaluate_student(
            &self.registry,
            student_id,
            gradings,
            course,
            attendance,
            presentation_points,
            criteria,
        )
    }

    /// Runs one full cohort summary.
    ///
    /// Source data is fetched up front in batched store calls (one per
    /// graded entity plus one each for criteria, attendance, and
    /// presentations), then per-student computation runs on spawned tasks,
    /// at most `parallelism` in flight at once. Per-student failures become
    /// [`SummaryOutcome::Unevaluable`] entries; the result always holds one
    /// entry per cohort member. Dropping the returned future aborts
    /// outstanding tasks and discards all partial results.
    pub async fn summarize_cohort(
        &self,
        cohort: &[String],
        course: &CourseInfo,
        stores: &CohortStores<'_>,
    ) -> Result<CohortSummary, EngineError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        let criteria = Arc::new(stores.criteria.all_criteria().await?);
        let tallies = stores.attendance.attendance_tallies(cohort).await?;
        let presentation = stores.presentations.presentation_points(cohort).await?;
        let mut per_student = self.fetch_gradings(cohort, course, stores.gradings).await?;

        tracing::debug!(
            run_id = %run_id,
            students = cohort.len(),
            criteria = criteria.len(),
            "starting cohort summary"
        );

        let course = Arc::new(course.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut tasks: JoinSet<Result<(String, SummaryOutcome), EngineError>> = JoinSet::new();

        for student_id in cohort {
            let student_id = student_id.clone();
            let semaphore = Arc::clone(&semaphore);
            let registry = Arc::clone(&self.registry);
            let course = Arc::clone(&course);
            let criteria = Arc::clone(&criteria);
            let gradings = per_student.remove(&student_id).unwrap_or_default();
            let attendance = tallies.get(&student_id).copied().unwrap_or_default();
            let points = presentation.get(&student_id).copied().unwrap_or(0.0);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| EngineError::Configuration("semaphore closed".into()))?;

                let outcome = match evaluate_student(
                    &registry,
                    &student_id,
                    &gradings,
                    &course,
                    attendance,
                    points,
                    &criteria,
                ) {
                    Ok(summary) => SummaryOutcome::Evaluated(summary),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        tracing::warn!("student '{student_id}' unevaluable: {e}");
                        SummaryOutcome::Unevaluable {
                            reason: e.to_string(),
                        }
                    }
                };

                Ok((student_id, outcome))
            });
        }

        let mut entries = HashMap::with_capacity(cohort.len());
        while let Some(joined) = tasks.join_next().await {
            let (student_id, outcome) = joined
                .map_err(|e| EngineError::Configuration(format!("evaluation task failed: {e}")))??;
            entries.insert(student_id, outcome);
        }

        Ok(CohortSummary {
            run_id,
            created_at: Utc::now(),
            entries,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Fetches all gradings for the cohort, batched per graded entity, and
    /// distributes team gradings to every member.
    async fn fetch_gradings(
        &self,
        cohort: &[String],
        course: &CourseInfo,
        store: &dyn GradingStore,
    ) -> Result<HashMap<String, Vec<Grading>>, EngineError> {
        let entities = course
            .sheets
            .iter()
            .map(|s| GradedEntity::Sheet(s.id.clone()))
            .chain(course.exams.iter().map(|e| GradedEntity::Exam(e.id.clone())));

        let mut per_student: HashMap<String, Vec<Grading>> = cohort
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();

        for entity in entities {
            for grading in store.all_gradings_for(cohort, &entity).await? {
                for student_id in &grading.students {
                    if let Some(list) = per_student.get_mut(student_id) {
                        list.push(grading.clone());
                    }
                }
            }
        }

        Ok(per_student)
    }
}

/// The per-student computation shared by [`SummaryService::summarize_student`]
/// and the spawned cohort tasks.
fn evaluate_student(
    registry: &Arc<CriteriaRegistry>,
    student_id: &str,
    gradings: &[Grading],
    course: &CourseInfo,
    attendance: AttendanceTally,
    presentation_points: f64,
    criteria: &[Criterion],
) -> Result<StudentSummary, EngineError> {
    let aggregate = StudentAggregate::collect(
        student_id,
        gradings,
        course,
        attendance,
        presentation_points,
    )?;

    let evaluator = CriteriaEvaluator::new(Arc::clone(registry));
    let mut summaries = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        summaries.push(evaluator.evaluate(criterion, &aggregate)?);
    }

    Ok(StudentSummary {
        student_id: student_id.to_string(),
        overall_passed: summaries.iter().all(|s| s.passed),
        criteria: summaries,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::model::{EntityInfo, ExerciseGrading};

    struct TestStores {
        gradings: Vec<Grading>,
        criteria: Vec<Criterion>,
        tallies: HashMap<String, AttendanceTally>,
        presentation: HashMap<String, f64>,
    }

    #[async_trait]
    impl GradingStore for TestStores {
        async fn grading_for(
            &self,
            student_id: &str,
            entity: &GradedEntity,
        ) -> Result<Grading, EngineError> {
            self.gradings
                .iter()
                .find(|g| &g.entity == entity && g.students.iter().any(|s| s == student_id))
                .cloned()
                .ok_or_else(|| EngineError::NotFound(format!("grading for {student_id}")))
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
    impl CriteriaConfigStore for TestStores {
        async fn all_criteria(&self) -> Result<Vec<Criterion>, EngineError> {
            Ok(self.criteria.clone())
        }
    }

    #[async_trait]
    impl AttendanceStore for TestStores {
        async fn attendance_tallies(
            &self,
            _cohort: &[String],
        ) -> Result<HashMap<String, AttendanceTally>, EngineError> {
            Ok(self.tallies.clone())
        }
    }

    #[async_trait]
    impl PresentationStore for TestStores {
        async fn presentation_points(
            &self,
            _cohort: &[String],
        ) -> Result<HashMap<String, f64>, EngineError> {
            Ok(self.presentation.clone())
        }
    }

    fn course() -> CourseInfo {
        CourseInfo {
            sheets: vec![EntityInfo {
                id: "sheet-1".into(),
                name: "Sheet 1".into(),
                possible_points: 10.0,
            }],
            exams: vec![],
        }
    }

    fn sheet_grading(points: Option<f64>, students: &[&str]) -> Grading {
        let mut grading = Grading::new(GradedEntity::Sheet("sheet-1".into()));
        grading.exercise_gradings.insert(
            "ex1".into(),
            ExerciseGrading {
                points,
                ..Default::default()
            },
        );
        for s in students {
            grading.add_student(s);
        }
        grading
    }

    fn attendance_criterion() -> Criterion {
        Criterion {
            id: "att".into(),
            identifier: "attendance".into(),
            params: json!({ "percentage": true, "value_needed": 0.8 }),
        }
    }

    fn service() -> SummaryService {
        SummaryService::new(
            Arc::new(CriteriaRegistry::with_builtin_rules().unwrap()),
            SummaryConfig::default(),
        )
    }

    #[test]
    fn zero_criteria_trivially_passes() {
        let summary = service()
            .summarize_student(
                "alice",
                &[],
                &course(),
                AttendanceTally::default(),
                0.0,
                &[],
            )
            .unwrap();

        assert!(summary.overall_passed);
        assert!(summary.criteria.is_empty());
    }

    #[test]
    fn one_failing_criterion_fails_overall() {
        let criteria = vec![
            attendance_criterion(),
            Criterion {
                id: "sheets".into(),
                identifier: "sheet_total".into(),
                params: json!({ "percentage": true, "value_needed": 0.9 }),
            },
        ];
        let gradings = vec![sheet_grading(Some(8.0), &["alice"])];

        let summary = service()
            .summarize_student(
                "alice",
                &gradings,
                &course(),
                AttendanceTally {
                    attended: 10,
                    total: 10,
                },
                0.0,
                &criteria,
            )
            .unwrap();

        // Attendance passes, sheet total (8/10 < 0.9) does not.
        assert!(!summary.overall_passed);
        assert_eq!(summary.criteria.len(), 2);
        assert!(summary.criteria.iter().any(|c| c.passed));
    }

    #[tokio::test]
    async fn cohort_isolates_malformed_student() {
        let cohort: Vec<String> = vec!["alice".into(), "bob".into(), "carol".into()];

        // Bob's grading violates the points/sub_exercise_points invariant.
        let stores = TestStores {
            gradings: vec![
                sheet_grading(Some(9.0), &["alice"]),
                sheet_grading(None, &["bob"]),
                sheet_grading(Some(8.0), &["carol"]),
            ],
            criteria: vec![attendance_criterion()],
            tallies: cohort
                .iter()
                .map(|id| {
                    (
                        id.clone(),
                        AttendanceTally {
                            attended: 9,
                            total: 10,
                        },
                    )
                })
                .collect(),
            presentation: HashMap::new(),
        };

        let summary = service()
            .summarize_cohort(
                &cohort,
                &course(),
                &CohortStores {
                    gradings: &stores,
                    criteria: &stores,
                    attendance: &stores,
                    presentations: &stores,
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.entries.len(), 3);
        assert_eq!(summary.unevaluable_count(), 1);
        assert_eq!(summary.passed_count(), 2);
        assert!(matches!(
            summary.entries.get("bob"),
            Some(SummaryOutcome::Unevaluable { reason }) if reason.contains("invalid grading data")
        ));
    }

    #[tokio::test]
    async fn cohort_flags_unimplemented_variant() {
        let cohort: Vec<String> = vec!["alice".into()];
        let stores = TestStores {
            gradings: vec![],
            criteria: vec![Criterion {
                id: "exam".into(),
                identifier: "scheinexam".into(),
                params: json!({ "percentage_of_all_points_needed": 0.5 }),
            }],
            tallies: HashMap::new(),
            presentation: HashMap::new(),
        };

        let summary = service()
            .summarize_cohort(
                &cohort,
                &course(),
                &CohortStores {
                    gradings: &stores,
                    criteria: &stores,
                    attendance: &stores,
                    presentations: &stores,
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.unevaluable_count(), 1);
        assert_eq!(summary.passed_count(), 0);
        assert_eq!(summary.failed_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cohort_evaluations_overlap_up_to_parallelism() {
        use std::sync::Barrier;

        use crate::criteria::ThresholdUnit;
        use crate::registry::CriterionRule;

        // Completes only when a second evaluation is in flight at the same
        // time; a sequential cohort run would never release the barrier.
        struct RendezvousRule {
            barrier: Arc<Barrier>,
        }

        impl CriterionRule for RendezvousRule {
            fn identifier(&self) -> &str {
                "rendezvous"
            }

            fn validate(&self, _params: &serde_json::Value) -> Result<(), EngineError> {
                Ok(())
            }

            fn evaluate(
                &self,
                criterion: &Criterion,
                _aggregate: &StudentAggregate,
            ) -> Result<CriterionSummary, EngineError> {
                self.barrier.wait();
                Ok(CriterionSummary {
                    criterion_id: criterion.id.clone(),
                    identifier: "rendezvous".into(),
                    passed: true,
                    achieved: 0.0,
                    needed: 0.0,
                    total: None,
                    unit: ThresholdUnit::Absolute,
                })
            }
        }

        let mut registry = CriteriaRegistry::new();
        registry
            .register(Arc::new(RendezvousRule {
                barrier: Arc::new(Barrier::new(2)),
            }))
            .unwrap();

        let service = SummaryService::new(
            Arc::new(registry),
            SummaryConfig { parallelism: 2 },
        );

        let cohort: Vec<String> = vec!["alice".into(), "bob".into()];
        let stores = TestStores {
            gradings: vec![],
            criteria: vec![Criterion {
                id: "sync".into(),
                identifier: "rendezvous".into(),
                params: json!({}),
            }],
            tallies: HashMap::new(),
            presentation: HashMap::new(),
        };

        let summary = service
            .summarize_cohort(
                &cohort,
                &course(),
                &CohortStores {
                    gradings: &stores,
                    criteria: &stores,
                    attendance: &stores,
                    presentations: &stores,
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.passed_count(), 2);
    }

    #[tokio::test]
    async fn team_grading_counts_for_every_member() {
        let cohort: Vec<String> = vec!["alice".into(), "bob".into()];
        let stores = TestStores {
            gradings: vec![sheet_grading(Some(10.0), &["alice", "bob"])],
            criteria: vec![Criterion {
                id: "sheets".into(),
                identifier: "sheet_total".into(),
                params: json!({ "percentage": true, "value_needed": 1.0 }),
            }],
            tallies: HashMap::new(),
            presentation: HashMap::new(),
        };

        let summary = service()
            .summarize_cohort(
                &cohort,
                &course(),
                &CohortStores {
                    gradings: &stores,
                    criteria: &stores,
                    attendance: &stores,
                    presentations: &stores,
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.passed_count(), 2);
    }
}
