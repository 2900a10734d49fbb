//! # Identity-Verification Decline Detection
//!
//! Scans a named child workflow's sub-runs for vendor decisions and
//! reports whether any of them declined the identity check.

use async_trait::async_trait;
use serde_json::Value;

use caserule_core::{resolve_path, CaseContext, DataValue, OperatorId, Rule};
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{check_shape, compile_shape, Operator, OperatorDeps};

/// True iff any sub-run of the named child workflow carries a vendor
/// decision of `"declined"` (case-insensitive).
#[derive(Debug)]
pub struct IdvCheck {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
    runs_shape: CompiledShape,
}

impl IdvCheck {
    pub fn new() -> Result<Self, RuleError> {
        let id = OperatorId::IdvCheck;
        Ok(Self {
            condition_shape: compile_shape(
                id,
                "child-workflow-reference",
                &shapes::child_workflow_reference(),
            )?,
            data_shape: compile_shape(id, "decision-statuses", &shapes::string_array())?,
            runs_shape: compile_shape(id, "child-workflow-runs", &shapes::child_workflow_runs())?,
        })
    }
}

#[async_trait]
impl Operator for IdvCheck {
    fn id(&self) -> OperatorId {
        OperatorId::IdvCheck
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn extract_value(
        &self,
        context: &CaseContext,
        rule: &Rule,
        _deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        let id = self.id();
        let workflow_name = rule
            .value
            .get("childWorkflowName")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::validation_msg(id, "childWorkflowName is required"))?;

        let runs_path = format!("childWorkflows.{workflow_name}");
        let runs = context
            .resolve(&runs_path)
            .ok_or_else(|| RuleError::not_found(id, runs_path.clone()))?;

        // Present but empty (or not an object) is a different failure
        // class than a missing key: the runs shape reports it with the
        // minProperties diagnostic.
        check_shape(id, &self.runs_shape, runs)?;

        let statuses: Vec<Value> = runs
            .as_object()
            .map(|runs| {
                runs.values()
                    .filter_map(|run| {
                        resolve_path(run, "result.vendorResult.decision.status")
                            .and_then(Value::as_str)
                    })
                    .filter(|status| !status.is_empty())
                    .map(|status| Value::String(status.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        if statuses.is_empty() {
            return Err(RuleError::Other("No decisions found".into()));
        }
        Ok(DataValue::Resolved(Value::Array(statuses)))
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        _condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let declined = data_value
            .as_array()
            .map(|statuses| {
                statuses.iter().any(|status| {
                    status
                        .as_str()
                        .map(|status| status.eq_ignore_ascii_case("declined"))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false);
        Ok(declined)
    }
}
