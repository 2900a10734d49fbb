//! # UBO Roster Comparison
//!
//! Compares the beneficial owners declared on the case (collected UBOs)
//! against the ownership graph reported by the corporate registry. Both
//! rosters are normalized to `UPPER(trim(first)) UPPER(trim(last))` and
//! sorted; any difference in membership is a mismatch.

use async_trait::async_trait;
use serde_json::{json, Value};

use caserule_core::{CaseContext, DataValue, OperatorId, Rule};
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{check_shape, compile_shape, Operator, OperatorDeps};

const COLLECTED_UBOS_PATH: &str = "entity.data.additionalInfo.ubos";
const REGISTRY_NODES_PATH: &str = "pluginsOutput.ubo.data.nodes";

/// True iff the collected and registry-sourced UBO rosters differ.
#[derive(Debug)]
pub struct UboMismatch {
    data_shape: CompiledShape,
    collected_shape: CompiledShape,
    nodes_shape: CompiledShape,
    person_shape: CompiledShape,
}

impl UboMismatch {
    pub fn new() -> Result<Self, RuleError> {
        let id = OperatorId::UboMismatch;
        Ok(Self {
            data_shape: compile_shape(id, "name-roster-report", &shapes::name_roster_report())?,
            collected_shape: compile_shape(id, "collected-ubos", &shapes::collected_ubos())?,
            nodes_shape: compile_shape(id, "registry-ubo-nodes", &shapes::registry_ubo_nodes())?,
            person_shape: compile_shape(id, "person-node", &shapes::person_node())?,
        })
    }
}

/// Normalize a person name for roster comparison.
fn normalize_name(first_name: &str, last_name: &str) -> String {
    format!(
        "{} {}",
        first_name.trim().to_uppercase(),
        last_name.trim().to_uppercase()
    )
}

fn name_fields(record: &Value) -> Option<(&str, &str)> {
    Some((
        record.get("firstName")?.as_str()?,
        record.get("lastName")?.as_str()?,
    ))
}

#[async_trait]
impl Operator for UboMismatch {
    fn id(&self) -> OperatorId {
        OperatorId::UboMismatch
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn extract_value(
        &self,
        context: &CaseContext,
        _rule: &Rule,
        _deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        let id = self.id();

        let ubos = context
            .resolve(COLLECTED_UBOS_PATH)
            .ok_or_else(|| RuleError::not_found(id, COLLECTED_UBOS_PATH))?;
        check_shape(id, &self.collected_shape, ubos)?;

        let mut collected: Vec<String> = ubos
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(name_fields)
            .map(|(first, last)| normalize_name(first, last))
            .collect();
        collected.sort();

        let nodes = context
            .resolve(REGISTRY_NODES_PATH)
            .ok_or_else(|| RuleError::not_found(id, REGISTRY_NODES_PATH))?;
        check_shape(id, &self.nodes_shape, nodes)?;

        let mut registry = Vec::new();
        for node in nodes.as_array().into_iter().flatten() {
            if node.get("type").and_then(Value::as_str) != Some("PERSON") {
                continue;
            }
            // Person nodes must carry a person name; anything else in the
            // ownership graph is filtered out before this check.
            check_shape(id, &self.person_shape, node)?;
            if let Some((first, last)) = name_fields(node) {
                registry.push(normalize_name(first, last));
            }
        }
        registry.sort();

        Ok(DataValue::Resolved(json!({
            "collected": collected,
            "registry": registry,
        })))
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        _condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let collected = data_value.get("collected").and_then(Value::as_array);
        let registry = data_value.get("registry").and_then(Value::as_array);
        match (collected, registry) {
            // Pointwise equality of the sorted rosters means no mismatch.
            (Some(collected), Some(registry)) => Ok(collected != registry),
            _ => Err(RuleError::validation_msg(
                self.id(),
                "expected a collected/registry roster report",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(collected: Value, nodes: Value) -> CaseContext {
        CaseContext::new(json!({
            "entity": { "data": { "additionalInfo": { "ubos": collected } } },
            "pluginsOutput": { "ubo": { "data": { "nodes": nodes } } }
        }))
    }

    async fn run(context: &CaseContext) -> Result<bool, RuleError> {
        let op = UboMismatch::new().unwrap();
        let rule = Rule::new(OperatorId::UboMismatch, json!(null));
        let deps = OperatorDeps::none();
        let data = op.extract_value(context, &rule, &deps).await?;
        op.execute(&data, &rule.value, &deps).await
    }

    #[tokio::test]
    async fn matching_rosters_in_any_order_are_no_mismatch() {
        let context = context(
            json!([
                { "firstName": "john", "lastName": "doe" },
                { "firstName": "  Jane ", "lastName": "Smith" }
            ]),
            json!([
                { "type": "PERSON", "firstName": "Jane", "lastName": "Smith" },
                { "type": "PERSON", "firstName": "John", "lastName": "Doe" },
                { "type": "COMPANY", "name": "Acme Holdings" }
            ]),
        );
        assert!(!run(&context).await.unwrap());
    }

    #[tokio::test]
    async fn missing_registry_entry_is_a_mismatch() {
        let context = context(
            json!([
                { "firstName": "John", "lastName": "Doe" },
                { "firstName": "Jane", "lastName": "Smith" }
            ]),
            json!([
                { "type": "PERSON", "firstName": "John", "lastName": "Doe" }
            ]),
        );
        assert!(run(&context).await.unwrap());
    }

    #[tokio::test]
    async fn differing_names_are_a_mismatch() {
        let context = context(
            json!([ { "firstName": "John", "lastName": "Doe" } ]),
            json!([ { "type": "PERSON", "firstName": "Jon", "lastName": "Doe" } ]),
        );
        assert!(run(&context).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_collected_ubo_is_a_validation_failure() {
        let context = context(
            json!([ { "firstName": "John" } ]),
            json!([]),
        );
        let err = run(&context).await.unwrap_err();
        assert!(matches!(err, RuleError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn person_node_without_name_is_a_validation_failure() {
        let context = context(
            json!([ { "firstName": "John", "lastName": "Doe" } ]),
            json!([ { "type": "PERSON" } ]),
        );
        let err = run(&context).await.unwrap_err();
        assert!(matches!(err, RuleError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn missing_collected_ubos_is_not_found() {
        let context = CaseContext::new(json!({
            "pluginsOutput": { "ubo": { "data": { "nodes": [] } } }
        }));
        let err = run(&context).await.unwrap_err();
        assert!(
            matches!(err, RuleError::DataValueNotFound { ref path, .. } if path == COLLECTED_UBOS_PATH)
        );
    }
}
