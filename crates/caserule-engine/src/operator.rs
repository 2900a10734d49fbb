//! # The Operator Contract
//!
//! Every operator implements the same four-step contract:
//!
//! 1. [`Operator::extract_value`] — pull the rule's data out of the case
//!    context. The default implementation resolves `rule.key` as a path
//!    (with path-to-path comparison when the rule requests it); derived
//!    operators override it entirely for multi-entity extraction.
//! 2. [`Operator::validate`] — check condition and data shapes.
//! 3. [`Operator::evaluate`] — the operator-specific decision function.
//! 4. [`Operator::execute`] — validate, then evaluate, normalizing the
//!    path-comparison form. The only post-extraction entry point.
//!
//! Operators are immutable singletons constructed once inside the
//! registry; nothing is mutated after construction, so any number of
//! tasks may evaluate concurrently against shared `&` references.
//!
//! External dependencies travel in [`OperatorDeps`], explicit at every
//! call site: the registry (nested condition dispatch), the workflow
//! helpers (related end-user fetch), and the matching client plus its
//! threshold (fuzzy comparison).

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use caserule_clients::{EntityMatchingClient, WorkflowHelpers};
use caserule_core::{CaseContext, DataValue, OperatorId, Rule};
use caserule_schema::{CompiledShape, SchemaError};

use crate::error::RuleError;
use crate::registry::OperatorRegistry;

/// Call-site dependencies for extraction and evaluation.
///
/// All fields are optional; an operator that needs a dependency the
/// caller did not supply fails with a descriptive error instead of
/// panicking.
#[derive(Clone, Copy, Default)]
pub struct OperatorDeps<'a> {
    /// Registry for nested sub-condition dispatch (AML checks).
    pub registry: Option<&'a OperatorRegistry>,
    /// Workflow case-data helpers (related end-user fetch).
    pub helpers: Option<&'a dyn WorkflowHelpers>,
    /// Entity-matching client (fuzzy name comparison).
    pub matching: Option<&'a dyn EntityMatchingClient>,
    /// Similarity threshold (0–100) for operators in the registry's
    /// `WITH_THRESHOLD` set.
    pub threshold: Option<f64>,
}

impl fmt::Debug for OperatorDeps<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDeps")
            .field("registry", &self.registry.is_some())
            .field("helpers", &self.helpers.is_some())
            .field("matching", &self.matching.is_some())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl<'a> OperatorDeps<'a> {
    /// Dependencies for purely-primitive evaluation (nothing injected).
    pub fn none() -> Self {
        Self::default()
    }
}

/// A named, typed condition evaluator.
///
/// Implementations must be `Send + Sync` and immutable after
/// construction. The trait is object-safe: the registry dispatches
/// through `&dyn Operator`.
#[async_trait]
pub trait Operator: Send + Sync + fmt::Debug {
    /// The identifier this operator is registered under.
    fn id(&self) -> OperatorId;

    /// Shape of the rule's condition value, when this operator has one.
    fn condition_shape(&self) -> Option<&CompiledShape> {
        None
    }

    /// Shape of the extracted data value, when this operator has one.
    fn data_shape(&self) -> Option<&CompiledShape> {
        None
    }

    /// Extract this rule's data value from the case context.
    ///
    /// The default implementation resolves `rule.key` as a dot path. If
    /// the rule requests path comparison and this operator is not in the
    /// registry's `WITHOUT_PATH_COMPARISON` set, `rule.value` is treated
    /// as a second path and both sides must resolve.
    ///
    /// # Errors
    ///
    /// `DataValueNotFound` naming the missing path; `ValidationFailed`
    /// when the rule itself is malformed (no key, non-string comparison
    /// path).
    async fn extract_value(
        &self,
        context: &CaseContext,
        rule: &Rule,
        _deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        default_extract(self.id(), context, rule)
    }

    /// Validate the condition and data values against this operator's
    /// shapes, if present.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` carrying the schema diagnostic.
    fn validate(&self, data_value: &Value, condition_value: &Value) -> Result<(), RuleError> {
        if let Some(shape) = self.condition_shape() {
            check_shape(self.id(), shape, condition_value)?;
        }
        if let Some(shape) = self.data_shape() {
            check_shape(self.id(), shape, data_value)?;
        }
        Ok(())
    }

    /// The operator-specific decision function.
    ///
    /// Pure in its inputs except where the operator explicitly depends on
    /// an injected client (fuzzy matching).
    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError>;

    /// Validate shapes, then evaluate.
    ///
    /// For a path-comparison extraction the comparison value substitutes
    /// for the condition value in both steps, so the caller can pass
    /// `rule.value` uniformly for every operator.
    async fn execute(
        &self,
        data_value: &DataValue,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let (data, condition) = match data_value {
            DataValue::Resolved(value) => (value, condition_value),
            DataValue::Compared {
                value,
                comparison_value,
            } => (value, comparison_value),
        };
        self.validate(data, condition)?;
        self.evaluate(data, condition, deps).await
    }
}

/// Run one compiled shape, mapping the diagnostic into `RuleError`.
pub(crate) fn check_shape(
    id: OperatorId,
    shape: &CompiledShape,
    instance: &Value,
) -> Result<(), RuleError> {
    shape
        .check(instance)
        .map_err(|e| RuleError::validation(id, e))
}

/// Compile a shape at operator construction time.
pub(crate) fn compile_shape(
    id: OperatorId,
    name: &str,
    schema: &Value,
) -> Result<CompiledShape, RuleError> {
    CompiledShape::compile(name, schema).map_err(|e: SchemaError| RuleError::validation(id, e))
}

/// Default key-path extraction, shared by every primitive operator.
pub(crate) fn default_extract(
    id: OperatorId,
    context: &CaseContext,
    rule: &Rule,
) -> Result<DataValue, RuleError> {
    let key = rule
        .key
        .as_deref()
        .ok_or_else(|| RuleError::validation_msg(id, "rule key is required"))?;

    let value = context
        .resolve(key)
        .cloned()
        .ok_or_else(|| RuleError::not_found(id, key))?;

    if rule.is_path_comparison && !OperatorRegistry::skips_path_comparison(id) {
        let comparison_path = rule.value.as_str().ok_or_else(|| {
            RuleError::validation_msg(
                id,
                "path comparison requires the rule value to be a string path",
            )
        })?;
        let comparison_value = context
            .resolve(comparison_path)
            .cloned()
            .ok_or_else(|| RuleError::not_found(id, comparison_path))?;
        return Ok(DataValue::Compared {
            value,
            comparison_value,
        });
    }

    Ok(DataValue::Resolved(value))
}
