//! Criterion rules and the evaluator dispatching over them.
//!
//! Each built-in variant lives in its own module and implements
//! [`CriterionRule`](crate::registry::CriterionRule). All percentage-capable
//! variants share the threshold rule in [`threshold_passed`]; they differ
//! only in how `achieved` and `total` are derived from the student's
//! aggregate.

pub mod attendance;
pub mod presentation;
pub mod scheinexam;
pub mod sheet_total;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::StudentAggregate;
use crate::error::EngineError;
use crate::model::Criterion;
use crate::registry::{CriteriaRegistry, CriterionRule};

/// How `achieved` and `needed` in a [`CriterionSummary`] are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdUnit {
    /// `needed` is a fraction of `total` in [0, 1].
    Percentage,
    /// `needed` is an absolute unit count.
    Absolute,
}

/// The verdict of one criterion for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionSummary {
    /// Id of the criterion instance this verdict belongs to.
    pub criterion_id: String,
    /// Rule variant that produced the verdict.
    pub identifier: String,
    pub passed: bool,
    /// Raw achieved units (sessions, points).
    pub achieved: f64,
    /// The configured threshold, in the unit given by `unit`.
    pub needed: f64,
    /// Achievable units, where the variant has a meaningful total.
    pub total: Option<f64>,
    pub unit: ThresholdUnit,
}

/// Parameters shared by all percentage-capable variants: a `percentage` flag
/// and the needed value, which is a fraction in [0, 1] when `percentage` is
/// set and an absolute unit count otherwise.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PossiblePercentageParams {
    pub percentage: bool,
    pub value_needed: f64,
}

impl PossiblePercentageParams {
    /// Deserializes and range-checks the parameters of one criterion
    /// instance.
    pub fn parse(params: &serde_json::Value) -> Result<Self, EngineError> {
        let parsed: Self = serde_json::from_value(params.clone())?;

        if parsed.percentage && !(0.0..=1.0).contains(&parsed.value_needed) {
            return Err(EngineError::Configuration(format!(
                "percentage 'value_needed' must be in [0, 1], got {}",
                parsed.value_needed
            )));
        }
        if !parsed.percentage && parsed.value_needed < 0.0 {
            return Err(EngineError::Configuration(format!(
                "absolute 'value_needed' must not be negative, got {}",
                parsed.value_needed
            )));
        }

        Ok(parsed)
    }

    /// The unit verdicts of this parameterization report in.
    pub fn unit(&self) -> ThresholdUnit {
        if self.percentage {
            ThresholdUnit::Percentage
        } else {
            ThresholdUnit::Absolute
        }
    }
}

/// The threshold rule shared by every percentage-capable variant.
///
/// With `percentage` set the criterion passes iff `achieved / total >=
/// value_needed`, inclusive at the boundary. A `total` of zero fails closed:
/// no division is performed and the verdict is `false`. Without `percentage`
/// the comparison is `achieved >= value_needed` in absolute units.
pub fn threshold_passed(achieved: f64, total: f64, percentage: bool, value_needed: f64) -> bool {
    if percentage {
        if total <= 0.0 {
            return false;
        }
        achieved / total >= value_needed
    } else {
        achieved >= value_needed
    }
}

/// Every built-in rule, in registration order.
pub fn builtin_rules() -> Vec<Arc<dyn CriterionRule>> {
    vec![
        Arc::new(attendance::AttendanceRule),
        Arc::new(presentation::PresentationRule),
        Arc::new(sheet_total::SheetTotalRule),
        Arc::new(scheinexam::ScheinexamRule),
    ]
}

/// Evaluates criterion instances by dispatching through a registry.
pub struct CriteriaEvaluator {
    registry: Arc<CriteriaRegistry>,
}

impl CriteriaEvaluator {
    pub fn new(registry: Arc<CriteriaRegistry>) -> Self {
        Self { registry }
    }

    /// Evaluates one criterion against one student's aggregate.
    ///
    /// Resolves the rule for the criterion's identifier, validates the
    /// instance parameters, then dispatches. Identical inputs yield
    /// bit-identical summaries; evaluation never mutates the criterion.
    pub fn evaluate(
        &self,
        criterion: &Criterion,
        aggregate: &StudentAggregate,
    ) -> Result<CriterionSummary, EngineError> {
        let rule = self.registry.resolve(&criterion.identifier)?;
        rule.validate(&criterion.params)?;
        rule.evaluate(criterion, aggregate)
    }
}
