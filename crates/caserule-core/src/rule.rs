//! # Rules & Extracted Data Values
//!
//! A [`Rule`] is a declarative condition owned by the external
//! rule-configuration store: a data path, an operator identifier, and an
//! operator-specific condition value. Rules are immutable; the engine
//! receives them per evaluation and never stores them.
//!
//! A [`DataValue`] is what extraction produces from the case context for
//! one rule: either a resolved JSON value (scalar or aggregated array),
//! or a `{value, comparisonValue}` pair when the rule compares two paths
//! within the same document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operator_id::OperatorId;

/// A declarative compliance/fraud condition.
///
/// Wire format is camelCase, matching stored rule configuration:
///
/// ```json
/// { "key": "entity.data.country", "operator": "IN", "value": ["IR", "KP"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Dot-separated path into the case context. Optional because some
    /// derived operators (sanctions categories, UBO comparison) extract
    /// from fixed locations instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// The operator evaluating this rule.
    pub operator: OperatorId,
    /// Operator-specific condition payload.
    pub value: Value,
    /// When set, `value` is itself a path into the case context and the
    /// rule compares two document fields. Operators in the registry's
    /// `WITHOUT_PATH_COMPARISON` set ignore this flag.
    #[serde(default)]
    pub is_path_comparison: bool,
}

impl Rule {
    /// Create a rule with no data key.
    pub fn new(operator: OperatorId, value: Value) -> Self {
        Self {
            key: None,
            operator,
            value,
            is_path_comparison: false,
        }
    }

    /// Create a rule extracting from the given context path.
    pub fn with_key(key: impl Into<String>, operator: OperatorId, value: Value) -> Self {
        Self {
            key: Some(key.into()),
            operator,
            value,
            is_path_comparison: false,
        }
    }

    /// Mark this rule as a path-to-path comparison.
    pub fn path_comparison(mut self) -> Self {
        self.is_path_comparison = true;
        self
    }
}

/// The value(s) extracted from a case context for one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// A resolved value — a scalar, or an array when the operator
    /// aggregates across multiple related entities.
    Resolved(Value),
    /// A path-relative comparison pair: the rule's key resolved to
    /// `value`, and the rule's condition value (itself a path) resolved
    /// to `comparison_value`.
    Compared {
        value: Value,
        comparison_value: Value,
    },
}

impl DataValue {
    /// The primary extracted value.
    pub fn value(&self) -> &Value {
        match self {
            Self::Resolved(value) => value,
            Self::Compared { value, .. } => value,
        }
    }

    /// The comparison value, when extraction was path-relative.
    pub fn comparison(&self) -> Option<&Value> {
        match self {
            Self::Resolved(_) => None,
            Self::Compared {
                comparison_value, ..
            } => Some(comparison_value),
        }
    }
}
