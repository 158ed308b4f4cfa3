//! Sheet total criterion: points over all exercise sheets.

use crate::aggregate::StudentAggregate;
use crate::criteria::{threshold_passed, CriterionSummary, PossiblePercentageParams};
use crate::error::EngineError;
use crate::model::Criterion;
use crate::registry::CriterionRule;

/// Passes when the points achieved across all sheets reach the threshold: a
/// fraction of the total achievable sheet points in percentage mode, an
/// absolute point count otherwise.
pub struct SheetTotalRule;

impl CriterionRule for SheetTotalRule {
    fn identifier(&self) -> &str {
        "sheet_total"
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
        let tally = aggregate.sheet_points;

        Ok(CriterionSummary {
            criterion_id: criterion.id.clone(),
            identifier: self.identifier().into(),
            passed: threshold_passed(
                tally.achieved,
                tally.possible,
                params.percentage,
                params.value_needed,
            ),
            achieved: tally.achieved,
            needed: params.value_needed,
            total: Some(tally.possible),
            unit: params.unit(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::criteria::testutil::{aggregate, criterion};

    #[test]
    fn half_of_possible_points_passes_at_half_threshold() {
        let rule = SheetTotalRule;
        let config = criterion("sheet_total", json!({ "percentage": true, "value_needed": 0.5 }));

        // 60 of 100 possible points.
        let summary = rule.evaluate(&config, &aggregate()).unwrap();
        assert!(summary.passed);
        assert_eq!(summary.total, Some(100.0));
    }

    #[test]
    fn above_achieved_ratio_fails() {
        let rule = SheetTotalRule;
        let config = criterion("sheet_total", json!({ "percentage": true, "value_needed": 0.7 }));
        assert!(!rule.evaluate(&config, &aggregate()).unwrap().passed);
    }

    #[test]
    fn course_without_sheets_fails_closed() {
        let rule = SheetTotalRule;
        let config = criterion("sheet_total", json!({ "percentage": true, "value_needed": 0.5 }));

        let mut agg = aggregate();
        agg.sheet_points.achieved = 0.0;
        agg.sheet_points.possible = 0.0;
        assert!(!rule.evaluate(&config, &agg).unwrap().passed);
    }

    #[test]
    fn absolute_point_threshold() {
        let rule = SheetTotalRule;
        let config = criterion("sheet_total", json!({ "percentage": false, "value_needed": 60.0 }));
        assert!(rule.evaluate(&config, &aggregate()).unwrap().passed);
    }
}
