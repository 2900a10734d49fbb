//! # Company Sanctions Category Screening
//!
//! Flattens every category string reported by the company-sanctions
//! plugin — across every source of every entry — and counts
//! case-insensitive matches of the condition's category against them.

use async_trait::async_trait;
use serde_json::Value;

use caserule_core::{CaseContext, DataValue, OperatorId, Rule};
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{check_shape, compile_shape, Operator, OperatorDeps};

/// True iff the condition's category appears at least `threshold` times
/// (default 1) among the plugin's reported categories.
#[derive(Debug)]
pub struct CompanySanctionsCategories {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
    entries_shape: CompiledShape,
}

impl CompanySanctionsCategories {
    pub fn new() -> Result<Self, RuleError> {
        let id = OperatorId::CompanySanctionsCategories;
        Ok(Self {
            condition_shape: compile_shape(
                id,
                "category-threshold",
                &shapes::category_threshold(),
            )?,
            data_shape: compile_shape(id, "category-list", &shapes::string_array())?,
            entries_shape: compile_shape(id, "sanctions-entries", &shapes::sanctions_data())?,
        })
    }
}

const SANCTIONS_DATA_PATH: &str = "pluginsOutput.companySanctions.data";

#[async_trait]
impl Operator for CompanySanctionsCategories {
    fn id(&self) -> OperatorId {
        OperatorId::CompanySanctionsCategories
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
        _rule: &Rule,
        _deps: &OperatorDeps<'_>,
    ) -> Result<DataValue, RuleError> {
        let id = self.id();
        let entries = context
            .resolve(SANCTIONS_DATA_PATH)
            .ok_or_else(|| RuleError::not_found(id, SANCTIONS_DATA_PATH))?;

        check_shape(id, &self.entries_shape, entries)?;

        let categories: Vec<Value> = entries
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("entity"))
            .filter_map(|entity| entity.get("sources").and_then(Value::as_array))
            .flatten()
            .filter_map(|source| source.get("categories").and_then(Value::as_array))
            .flatten()
            .filter(|category| category.is_string())
            .cloned()
            .collect();

        Ok(DataValue::Resolved(Value::Array(categories)))
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        _deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let id = self.id();
        let category = condition_value
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| RuleError::validation_msg(id, "condition requires a category"))?;
        let threshold = condition_value
            .get("threshold")
            .and_then(Value::as_u64)
            .unwrap_or(1) as usize;

        let count = data_value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter(|candidate| candidate.eq_ignore_ascii_case(category))
            .count();

        Ok(count >= threshold)
    }
}
