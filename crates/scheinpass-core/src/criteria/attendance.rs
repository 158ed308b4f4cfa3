//! Attendance criterion: attended vs. held tutorial sessions.

use crate::aggregate::StudentAggregate;
use crate::criteria::{threshold_passed, CriterionSummary, PossiblePercentageParams};
use crate::error::EngineError;
use crate::model::Criterion;
use crate::registry::CriterionRule;

/// Passes when the student attended enough sessions: a fraction of all held
/// sessions in percentage mode, an absolute session count otherwise.
pub struct AttendanceRule;

impl CriterionRule for AttendanceRule {
    fn identifier(&self) -> &str {
        "attendance"
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), EngineError> {
        PossiblePercentageParams::parse(params).map(|_| ())
    }

    fn evaluate(
        &self,
        criterion: &Criterion,
        aggregate: &StudentAggregate,
    ) -> Result<CriterionSummary, EngineError> {
        let params = PossiblePercentageParams::parse(&criterion.params)?;

        let achieved = f64::from(aggregate.attendance.attended);
        let total = f64::from(aggregate.attendance.total);

        Ok(CriterionSummary {
            criterion_id: criterion.id.clone(),
            identifier: self.identifier().into(),
            passed: threshold_passed(achieved, total, params.percentage, params.value_needed),
            achieved,
            needed: params.value_needed,
            total: Some(total),
            unit: params.unit(),
        })
    }
}
