//! Criteria registry: binds criterion type identifiers to rule behavior.
//!
//! New criterion variants are added by registering a rule, not by branching
//! in the evaluator. Registration is explicit: the upstream system let
//! criterion classes self-register as an import side effect, which made
//! correctness depend on module load order. Here a registry is built via
//! [`CriteriaRegistry::with_builtin_rules`] (or assembled by hand) before
//! first use.

use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::StudentAggregate;
use crate::criteria::CriterionSummary;
use crate::error::EngineError;
use crate::model::Criterion;

/// Behavior of one criterion variant.
///
/// `validate` checks that a criterion instance carries the parameters the
/// variant requires; `evaluate` derives the pass/fail verdict from a
/// student's aggregate. Both take the parameters as opaque JSON and
/// deserialize their own typed view.
pub trait CriterionRule: Send + Sync {
    /// The identifier this rule is registered under, e.g. "attendance".
    fn identifier(&self) -> &str;

    /// Checks the parameters of a criterion instance of this variant.
    fn validate(&self, params: &serde_json::Value) -> Result<(), EngineError>;

    /// Evaluates one criterion instance against one student's aggregate.
    fn evaluate(
        &self,
        criterion: &Criterion,
        aggregate: &StudentAggregate,
    ) -> Result<CriterionSummary, EngineError>;
}

/// Lookup table from criterion type identifier to rule behavior.
#[derive(Default)]
pub struct CriteriaRegistry {
    rules: HashMap<String, Arc<dyn CriterionRule>>,
}

impl CriteriaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in rule registered.
    pub fn with_builtin_rules() -> Result<Self, EngineError> {
        let mut registry = Self::new();
        for rule in crate::criteria::builtin_rules() {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Registers a rule under its identifier.
    ///
    /// Registering an identifier twice fails with
    /// [`EngineError::DuplicateRegistration`]. That error is fatal: it
    /// indicates an inconsistent rule set and must prevent the engine from
    /// serving any evaluation.
    pub fn register(&mut self, rule: Arc<dyn CriterionRule>) -> Result<(), EngineError> {
        let identifier = rule.identifier().to_string();
        if self.rules.contains_key(&identifier) {
            return Err(EngineError::DuplicateRegistration { identifier });
        }
        tracing::debug!("registered criterion rule '{identifier}'");
        self.rules.insert(identifier, rule);
        Ok(())
    }

    /// Resolves the rule registered under `identifier`.
    pub fn resolve(&self, identifier: &str) -> Result<&Arc<dyn CriterionRule>, EngineError> {
        self.rules.get(identifier).ok_or_else(|| {
            EngineError::NotFound(format!("no criterion rule registered for '{identifier}'"))
        })
    }

    /// All registered identifiers, sorted for stable output.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
