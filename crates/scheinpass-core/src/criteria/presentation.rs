//! Presentation criterion: total presentation points.

use serde::Deserialize;

use crate::aggregate::StudentAggregate;
use crate::criteria::{threshold_passed, CriterionSummary, ThresholdUnit};
use crate::error::EngineError;
use crate::model::Criterion;
use crate::registry::CriterionRule;

#[derive(Debug, Clone, Copy, Deserialize)]
struct PresentationParams {
    value_needed: f64,
}

impl PresentationParams {
    fn parse(params: &serde_json::Value) -> Result<Self, EngineError> {
        let parsed: Self = serde_json::from_value(params.clone())?;
        if parsed.value_needed < 0.0 {
            return Err(EngineError::Configuration(format!(
                "'value_needed' must not be negative, got {}",
                parsed.value_needed
            )));
        }
        Ok(parsed)
    }
}

/// Passes when the student collected at least `value_needed` presentation
/// points. Presentations have no meaningful total, so this variant is
/// absolute-only.
pub struct PresentationRule;

impl CriterionRule for PresentationRule {
    fn identifier(&self) -> &str {
        "presentation"
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), EngineError> {
        PresentationParams::parse(params).map(|_| ())
    }

    fn evaluate(
        &self,
        criterion: &Criterion,
        aggregate: &StudentAggregate,
    ) -> Result<CriterionSummary, EngineError> {
        let params = PresentationParams::parse(&criterion.params)?;
        let achieved = aggregate.presentation_points;

        Ok(CriterionSummary {
            criterion_id: criterion.id.clone(),
            identifier: self.identifier().into(),
            passed: threshold_passed(achieved, 0.0, false, params.value_needed),
            achieved,
            needed: params.value_needed,
            total: None,
            unit: ThresholdUnit::Absolute,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::criteria::testutil::{aggregate, criterion};

    #[test]
    fn needed_count_is_inclusive() {
        let rule = PresentationRule;
        let config = criterion("presentation", json!({ "value_needed": 2.0 }));

        let summary = rule.evaluate(&config, &aggregate()).unwrap();
        assert!(summary.passed);
        assert_eq!(summary.total, None);
    }

    #[test]
    fn too_few_points_fails() {
        let rule = PresentationRule;
        let config = criterion("presentation", json!({ "value_needed": 3.0 }));
        assert!(!rule.evaluate(&config, &aggregate()).unwrap().passed);
    }

    #[test]
    fn negative_threshold_rejected() {
        let rule = PresentationRule;
        assert!(matches!(
            rule.validate(&json!({ "value_needed": -1.0 })),
            Err(EngineError::Configuration(_))
        ));
    }
}
