//! # Operator Registry — Exhaustive Dispatch
//!
//! One immutable instance of every operator, constructed once at process
//! start and shared for the process lifetime. Dispatch from
//! [`OperatorId`] is an exhaustive `match`: adding a variant to the enum
//! is a compile error here until the new operator is wired in. This is
//! the typed replacement for looking evaluation methods up by name at
//! runtime.
//!
//! The registry also owns the two operator metadata sets:
//!
//! - [`WITHOUT_PATH_COMPARISON`](OperatorRegistry::WITHOUT_PATH_COMPARISON)
//!   — operators whose condition value is never reinterpreted as a
//!   second context path, whatever the rule's flag says.
//! - [`WITH_THRESHOLD`](OperatorRegistry::WITH_THRESHOLD) — operators
//!   requiring a numeric threshold in their call-site dependencies.

use caserule_core::{CaseContext, OperatorId, Rule};

use crate::aml::{AmlCheck, AmlCheckV2};
use crate::error::RuleError;
use crate::fuzzy::FuzzyMatchScoreLt;
use crate::idv::IdvCheck;
use crate::operator::{Operator, OperatorDeps};
use crate::primitives::{
    Between, Equals, Exists, GreaterThan, GreaterThanOrEqual, In, InCaseInsensitive, LastYear,
    LessThan, LessThanOrEqual, NotEquals, NotIn,
};
use crate::sanctions::CompanySanctionsCategories;
use crate::ubo::UboMismatch;

/// The full operator set, one immutable instance per identifier.
#[derive(Debug)]
pub struct OperatorRegistry {
    equals: Equals,
    not_equals: NotEquals,
    greater_than: GreaterThan,
    less_than: LessThan,
    greater_than_or_equal: GreaterThanOrEqual,
    less_than_or_equal: LessThanOrEqual,
    between: Between,
    in_values: In,
    not_in_values: NotIn,
    in_case_insensitive: InCaseInsensitive,
    last_year: LastYear,
    exists: Exists,
    aml_check: AmlCheck,
    aml_check_v2: AmlCheckV2,
    idv_check: IdvCheck,
    company_sanctions_categories: CompanySanctionsCategories,
    ubo_mismatch: UboMismatch,
    fuzzy_match_score_lt: FuzzyMatchScoreLt,
}

impl OperatorRegistry {
    /// Operators that never apply path-comparison semantics to the rule
    /// value, regardless of the rule's `isPathComparison` flag.
    pub const WITHOUT_PATH_COMPARISON: &'static [OperatorId] = &[
        OperatorId::AmlCheck,
        OperatorId::AmlCheckV2,
        OperatorId::Between,
        OperatorId::LastYear,
        OperatorId::IdvCheck,
        OperatorId::CompanySanctionsCategories,
    ];

    /// Operators requiring a numeric `threshold` dependency.
    pub const WITH_THRESHOLD: &'static [OperatorId] = &[OperatorId::FuzzyMatchScoreLt];

    /// Construct every operator, compiling their shapes.
    ///
    /// # Errors
    ///
    /// Fails only if a shape definition does not compile — a defect in
    /// the engine itself, surfaced at startup rather than mid-evaluation.
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            equals: Equals::new()?,
            not_equals: NotEquals::new()?,
            greater_than: GreaterThan::new()?,
            less_than: LessThan::new()?,
            greater_than_or_equal: GreaterThanOrEqual::new()?,
            less_than_or_equal: LessThanOrEqual::new()?,
            between: Between::new()?,
            in_values: In::new()?,
            not_in_values: NotIn::new()?,
            in_case_insensitive: InCaseInsensitive::new()?,
            last_year: LastYear::new()?,
            exists: Exists::new(),
            aml_check: AmlCheck::new()?,
            aml_check_v2: AmlCheckV2::new()?,
            idv_check: IdvCheck::new()?,
            company_sanctions_categories: CompanySanctionsCategories::new()?,
            ubo_mismatch: UboMismatch::new()?,
            fuzzy_match_score_lt: FuzzyMatchScoreLt::new()?,
        })
    }

    /// Look up the operator registered for an identifier.
    ///
    /// Total by construction: the match below is exhaustive over
    /// `OperatorId`, so every identifier resolves to an operator.
    pub fn get(&self, id: OperatorId) -> &dyn Operator {
        match id {
            OperatorId::Equals => &self.equals,
            OperatorId::NotEquals => &self.not_equals,
            OperatorId::Gt => &self.greater_than,
            OperatorId::Lt => &self.less_than,
            OperatorId::Gte => &self.greater_than_or_equal,
            OperatorId::Lte => &self.less_than_or_equal,
            OperatorId::Between => &self.between,
            OperatorId::In => &self.in_values,
            OperatorId::NotIn => &self.not_in_values,
            OperatorId::InCaseInsensitive => &self.in_case_insensitive,
            OperatorId::LastYear => &self.last_year,
            OperatorId::Exists => &self.exists,
            OperatorId::AmlCheck => &self.aml_check,
            OperatorId::AmlCheckV2 => &self.aml_check_v2,
            OperatorId::IdvCheck => &self.idv_check,
            OperatorId::CompanySanctionsCategories => &self.company_sanctions_categories,
            OperatorId::UboMismatch => &self.ubo_mismatch,
            OperatorId::FuzzyMatchScoreLt => &self.fuzzy_match_score_lt,
        }
    }

    /// Whether an operator ignores the rule's path-comparison flag.
    pub fn skips_path_comparison(id: OperatorId) -> bool {
        Self::WITHOUT_PATH_COMPARISON.contains(&id)
    }

    /// Whether an operator requires the `threshold` dependency.
    pub fn requires_threshold(id: OperatorId) -> bool {
        Self::WITH_THRESHOLD.contains(&id)
    }

    /// Extract and execute one rule against a case context.
    ///
    /// Convenience wrapper over the two-step contract; the registry
    /// injects itself into the dependencies so nested sub-conditions
    /// always dispatch.
    pub async fn evaluate_rule(
        &self,
        rule: &Rule,
        context: &CaseContext,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let deps = OperatorDeps {
            registry: Some(self),
            ..*deps
        };
        let operator = self.get(rule.operator);
        let data_value = operator.extract_value(context, rule, &deps).await?;
        operator.execute(&data_value, &rule.value, &deps).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_identifier_resolves_to_its_own_operator() {
        let registry = OperatorRegistry::new().unwrap();
        for &id in OperatorId::all() {
            assert_eq!(registry.get(id).id(), id, "registry wiring for {id}");
        }
    }

    #[test]
    fn path_comparison_metadata_covers_the_derived_operators() {
        for id in [
            OperatorId::AmlCheck,
            OperatorId::AmlCheckV2,
            OperatorId::Between,
            OperatorId::LastYear,
            OperatorId::IdvCheck,
            OperatorId::CompanySanctionsCategories,
        ] {
            assert!(OperatorRegistry::skips_path_comparison(id), "{id}");
        }
        for id in [
            OperatorId::Equals,
            OperatorId::In,
            OperatorId::FuzzyMatchScoreLt,
        ] {
            assert!(!OperatorRegistry::skips_path_comparison(id), "{id}");
        }
    }

    #[test]
    fn threshold_metadata_names_only_the_fuzzy_operator() {
        for &id in OperatorId::all() {
            assert_eq!(
                OperatorRegistry::requires_threshold(id),
                id == OperatorId::FuzzyMatchScoreLt,
                "{id}"
            );
        }
    }

    #[tokio::test]
    async fn evaluate_rule_runs_the_full_contract() {
        let registry = OperatorRegistry::new().unwrap();
        let context = CaseContext::new(json!({
            "entity": { "data": { "country": "DE" } }
        }));
        let rule = Rule::with_key(
            "entity.data.country",
            OperatorId::In,
            json!(["DE", "FR"]),
        );
        let verdict = registry
            .evaluate_rule(&rule, &context, &OperatorDeps::none())
            .await
            .unwrap();
        assert!(verdict);
    }

    #[tokio::test]
    async fn evaluate_rule_injects_itself_for_nested_dispatch() {
        let registry = OperatorRegistry::new().unwrap();
        let context = CaseContext::new(json!({
            "childWorkflows": {
                "aml_screen": {
                    "run_1": {
                        "result": { "vendorResult": { "aml": { "hits": [
                            { "countries": ["IR"] }
                        ] } } }
                    }
                }
            }
        }));
        let rule = Rule::with_key(
            "countries",
            OperatorId::AmlCheck,
            json!({
                "operator": "IN_CASE_INSENSITIVE",
                "value": ["ir"],
                "childWorkflowName": "aml_screen"
            }),
        );
        // No registry in the caller's deps — evaluate_rule supplies it.
        let verdict = registry
            .evaluate_rule(&rule, &context, &OperatorDeps::none())
            .await
            .unwrap();
        assert!(verdict);
    }

    #[tokio::test]
    async fn between_ignores_path_comparison_flag_end_to_end() {
        let registry = OperatorRegistry::new().unwrap();
        let context = CaseContext::new(json!({ "amount": 100 }));
        let rule = Rule::with_key(
            "amount",
            OperatorId::Between,
            json!({"min": 50, "max": 150}),
        )
        .path_comparison();
        let verdict = registry
            .evaluate_rule(&rule, &context, &OperatorDeps::none())
            .await
            .unwrap();
        assert!(verdict, "the flag must not leak into range evaluation");
    }
}
