//! Schein exam criterion.
//!
//! The upstream system configured this variant but never finished its
//! pass/fail formula; its evaluation threw a generic "not implemented"
//! error. The parameters are validated so misconfiguration is still caught,
//! but evaluation fails closed with [`EngineError::NotImplemented`] instead
//! of guessing the intended derivation. The summary service turns that into
//! an unevaluable entry rather than a silent pass or fail.

use serde::Deserialize;

use crate::aggregate::StudentAggregate;
use crate::criteria::CriterionSummary;
use crate::error::EngineError;
use crate::model::Criterion;
use crate::registry::CriterionRule;

#[derive(Debug, Clone, Copy, Deserialize)]
struct ScheinexamParams {
    percentage_of_all_points_needed: f64,
    #[serde(default)]
    #[allow(dead_code)]
    pass_all_exams_individually: bool,
}

impl ScheinexamParams {
    fn parse(params: &serde_json::Value) -> Result<Self, EngineError> {
        let parsed: Self = serde_json::from_value(params.clone())?;
        if !(0.0..=1.0).contains(&parsed.percentage_of_all_points_needed) {
            return Err(EngineError::Configuration(format!(
                "'percentage_of_all_points_needed' must be in [0, 1], got {}",
                parsed.percentage_of_all_points_needed
            )));
        }
        Ok(parsed)
    }
}

/// Registered but without a concrete evaluation rule.
pub struct ScheinexamRule;

impl CriterionRule for ScheinexamRule {
    fn identifier(&self) -> &str {
        "scheinexam"
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), EngineError> {
        ScheinexamParams::parse(params).map(|_| ())
    }

    fn evaluate(
        &self,
        _criterion: &Criterion,
        _aggregate: &StudentAggregate,
    ) -> Result<CriterionSummary, EngineError> {
        Err(EngineError::NotImplemented(self.identifier().into()))
    }
}
