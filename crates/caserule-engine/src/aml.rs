//! # AML Screening Operators
//!
//! Both AML operators answer the same question — does any AML hit
//! belonging to the case's related parties satisfy a nested sub-condition
//! — but extract hits from different places:
//!
//! - [`AmlCheck`] (v1) reads vendor hits out of a named child workflow's
//!   completed sub-runs inside the case document itself.
//! - [`AmlCheckV2`] resolves related end-users (UBOs, directors, main
//!   representative) and fetches their stored hits through
//!   [`WorkflowHelpers`](caserule_clients::WorkflowHelpers), fanning the
//!   lookups out in parallel.
//!
//! The two differ deliberately in their empty-case posture: v1 treats "no
//! hits" as a data error, v2 treats "nothing to check" as a clean `false`.
//!
//! Evaluation is shared: the condition names a sub-operator from the
//! registry and the check passes if any hit value satisfies it. A hit
//! that fails the sub-operator's shapes counts as a non-match rather than
//! aborting the run — one malformed vendor record must not block the
//! screening of all the others.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;

use caserule_core::{resolve_path, CaseContext, DataValue, OperatorId, Rule};
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{compile_shape, Operator, OperatorDeps};

/// Shared nested-condition evaluation: true iff any element of the data
/// value satisfies the named sub-operator.
pub(crate) async fn evaluate_nested(
    id: OperatorId,
    data_value: &Value,
    condition_value: &Value,
    deps: &OperatorDeps<'_>,
) -> Result<bool, RuleError> {
    let registry = deps.registry.ok_or_else(|| {
        RuleError::Other("operator registry is required for nested condition dispatch".into())
    })?;

    let raw_operator = condition_value
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| RuleError::validation_msg(id, "nested condition requires an operator"))?;
    let sub_id: OperatorId = raw_operator
        .parse()
        .map_err(|_| RuleError::validation_msg(id, format!("unknown nested operator: {raw_operator}")))?;
    let sub_condition = condition_value
        .get("value")
        .ok_or_else(|| RuleError::validation_msg(id, "nested condition requires a value"))?;
    let sub_operator = registry.get(sub_id);

    let elements: Vec<&Value> = match data_value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    for element in elements {
        // A shape miss on an individual hit degrades to a non-match for
        // that hit; the aggregate check continues.
        let admitted = sub_operator
            .data_shape()
            .map(|shape| shape.is_valid(element))
            .unwrap_or(true)
            && sub_operator
                .condition_shape()
                .map(|shape| shape.is_valid(sub_condition))
                .unwrap_or(true);
        if !admitted {
            tracing::debug!(
                operator = %id,
                sub_operator = %sub_id,
                "hit value rejected by sub-operator shapes, treating as non-match"
            );
            continue;
        }
        if sub_operator.evaluate(element, sub_condition, deps).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

// ---------------------------------------------------------------------------
// AmlCheck (v1) — child-workflow vendor hits
// ---------------------------------------------------------------------------

/// AML screening over a named child workflow's vendor hits.
#[derive(Debug)]
pub struct AmlCheck {
    condition_shape: CompiledShape,
}

impl AmlCheck {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            condition_shape: compile_shape(
                OperatorId::AmlCheck,
                "nested-condition-v1",
                &shapes::nested_condition(true),
            )?,
        })
    }
}

#[async_trait]
impl Operator for AmlCheck {
    fn id(&self) -> OperatorId {
        OperatorId::AmlCheck
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    async fn extract_value(
        &self,
        context: &CaseContext,
        rule: &Rule,
        _deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        let id = self.id();
        let key = rule
            .key
            .as_deref()
            .ok_or_else(|| RuleError::validation_msg(id, "rule key is required"))?;
        let workflow_name = rule
            .value
            .get("childWorkflowName")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::validation_msg(id, "childWorkflowName is required"))?;

        let runs_path = format!("childWorkflows.{workflow_name}");
        let runs = context
            .resolve(&runs_path)
            .and_then(Value::as_object)
            .ok_or_else(|| RuleError::not_found(id, runs_path.clone()))?;

        // Flatten vendor hits across every completed sub-run, resolving
        // the rule key within each hit. A hit missing the key resolves to
        // null so the per-hit shape check downgrades it instead of the
        // whole extraction failing.
        let mut hit_values = Vec::new();
        for run in runs.values() {
            if let Some(hits) =
                resolve_path(run, "result.vendorResult.aml.hits").and_then(Value::as_array)
            {
                for hit in hits {
                    hit_values.push(resolve_path(hit, key).cloned().unwrap_or(Value::Null));
                }
            }
        }

        if hit_values.is_empty() {
            return Err(RuleError::not_found(
                id,
                format!("{runs_path}.*.result.vendorResult.aml.hits"),
            ));
        }
        Ok(DataValue::Resolved(Value::Array(hit_values)))
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        evaluate_nested(self.id(), data_value, condition_value, deps).await
    }
}

// ---------------------------------------------------------------------------
// AmlCheckV2 — related end-users' stored hits
// ---------------------------------------------------------------------------

/// AML screening over the stored hits of the case's related end-users.
#[derive(Debug)]
pub struct AmlCheckV2 {
    condition_shape: CompiledShape,
}

impl AmlCheckV2 {
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            condition_shape: compile_shape(
                OperatorId::AmlCheckV2,
                "nested-condition",
                &shapes::nested_condition(false),
            )?,
        })
    }
}

/// Collect related end-user ids from the case's additional info:
/// `ubos[].endUserId`, `directors[].endUserId`, and
/// `mainRepresentative.endUserId`, deduplicated in encounter order.
fn related_end_user_ids(additional_info: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for list_key in ["ubos", "directors"] {
        if let Some(entries) = additional_info.get(list_key).and_then(Value::as_array) {
            for entry in entries {
                if let Some(user_id) = entry.get("endUserId").and_then(Value::as_str) {
                    if !user_id.is_empty() && seen.insert(user_id.to_string()) {
                        ids.push(user_id.to_string());
                    }
                }
            }
        }
    }

    if let Some(user_id) = additional_info
        .get("mainRepresentative")
        .and_then(|representative| representative.get("endUserId"))
        .and_then(Value::as_str)
    {
        if !user_id.is_empty() && seen.insert(user_id.to_string()) {
            ids.push(user_id.to_string());
        }
    }

    ids
}

#[async_trait]
impl Operator for AmlCheckV2 {
    fn id(&self) -> OperatorId {
        OperatorId::AmlCheckV2
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    async fn extract_value(
        &self,
        context: &CaseContext,
        rule: &Rule,
        deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        let id = self.id();
        let key = rule
            .key
            .as_deref()
            .ok_or_else(|| RuleError::validation_msg(id, "rule key is required"))?;

        // Tolerant of "nothing to check": no related parties and no hits
        // both extract a clean false instead of raising.
        let additional_info = match context.resolve("entity.data.additionalInfo") {
            Some(info) => info,
            None => return Ok(DataValue::Resolved(Value::Bool(false))),
        };
        let ids = related_end_user_ids(additional_info);
        if ids.is_empty() {
            return Ok(DataValue::Resolved(Value::Bool(false)));
        }

        let helpers = deps.helpers.ok_or_else(|| {
            RuleError::Other("workflow helpers are required for related end-user screening".into())
        })?;

        // Parallel fan-out; a single failed fetch fails the extraction.
        let users =
            try_join_all(ids.iter().map(|user_id| helpers.get_end_user_by_id(user_id))).await?;

        let mut hit_values = Vec::new();
        for user in &users {
            for hit in &user.aml_hits {
                let hit_json = serde_json::to_value(hit)
                    .map_err(|e| RuleError::Other(format!("failed to serialize AML hit: {e}")))?;
                hit_values.push(resolve_path(&hit_json, key).cloned().unwrap_or(Value::Null));
            }
        }

        if hit_values.is_empty() {
            return Ok(DataValue::Resolved(Value::Bool(false)));
        }
        Ok(DataValue::Resolved(Value::Array(hit_values)))
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        evaluate_nested(self.id(), data_value, condition_value, deps).await
    }
}
