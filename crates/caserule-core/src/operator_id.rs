//! # Operator Identifiers — Single Source of Truth
//!
//! Defines the `OperatorId` enum with all 18 rule operators. This is the
//! ONE definition used across the entire stack. Every `match` on
//! `OperatorId` must be exhaustive — adding a new operator forces every
//! consumer to handle it at compile time.
//!
//! The wire format is SCREAMING_SNAKE_CASE (`"EQUALS"`, `"AML_CHECK_V2"`,
//! …), matching the identifiers stored in rule configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All condition operators understood by the rule engine.
///
/// Operators fall into two families:
///
/// - **Primitive** operators compare a single extracted value against a
///   condition value (`Equals`, `Gt`, `Between`, `In`, …).
/// - **Derived** operators own their extraction logic and aggregate over
///   nested or related entities (`AmlCheck`, `UboMismatch`, …).
///
/// The registry in `caserule-engine` maps each identifier to its operator
/// implementation via an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorId {
    /// Strict equality.
    Equals,
    /// Strict inequality.
    NotEquals,
    /// Greater-than on the primitive's native ordering.
    Gt,
    /// Less-than on the primitive's native ordering.
    Lt,
    /// Greater-than-or-equal (composed: Equals ∨ Gt).
    Gte,
    /// Less-than-or-equal (composed: Equals ∨ Lt).
    Lte,
    /// Inclusive range membership against `{min, max}`.
    Between,
    /// Array membership by exact equality.
    In,
    /// Negated array membership.
    NotIn,
    /// Case-insensitive containment against a condition array.
    InCaseInsensitive,
    /// Date recency against `{years}`.
    LastYear,
    /// Deprecated: non-emptiness check retained for legacy rule configs.
    Exists,
    /// AML screening over a child workflow's vendor hits.
    AmlCheck,
    /// AML screening over related end-users' stored hits.
    AmlCheckV2,
    /// Identity-verification decline detection over a child workflow.
    IdvCheck,
    /// Category-count screening over company sanctions plugin output.
    CompanySanctionsCategories,
    /// Collected-vs-registry UBO roster comparison.
    UboMismatch,
    /// Name-similarity score below threshold via the matching service.
    FuzzyMatchScoreLt,
}

/// Total number of operators. Used for registry coverage assertions.
pub const OPERATOR_COUNT: usize = 18;

impl OperatorId {
    /// Returns all operators in canonical order.
    pub fn all() -> &'static [OperatorId] {
        &[
            Self::Equals,
            Self::NotEquals,
            Self::Gt,
            Self::Lt,
            Self::Gte,
            Self::Lte,
            Self::Between,
            Self::In,
            Self::NotIn,
            Self::InCaseInsensitive,
            Self::LastYear,
            Self::Exists,
            Self::AmlCheck,
            Self::AmlCheckV2,
            Self::IdvCheck,
            Self::CompanySanctionsCategories,
            Self::UboMismatch,
            Self::FuzzyMatchScoreLt,
        ]
    }

    /// Returns the SCREAMING_SNAKE_CASE identifier for this operator.
    ///
    /// This must match the serde serialization format and the identifiers
    /// used by stored rule configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Gt => "GT",
            Self::Lt => "LT",
            Self::Gte => "GTE",
            Self::Lte => "LTE",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::InCaseInsensitive => "IN_CASE_INSENSITIVE",
            Self::LastYear => "LAST_YEAR",
            Self::Exists => "EXISTS",
            Self::AmlCheck => "AML_CHECK",
            Self::AmlCheckV2 => "AML_CHECK_V2",
            Self::IdvCheck => "IDV_CHECK",
            Self::CompanySanctionsCategories => "COMPANY_SANCTIONS_CATEGORIES",
            Self::UboMismatch => "UBO_MISMATCH",
            Self::FuzzyMatchScoreLt => "FUZZY_MATCH_SCORE_LT",
        }
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operator identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator: {}", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for OperatorId {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_operator_once() {
        let all = OperatorId::all();
        assert_eq!(all.len(), OPERATOR_COUNT);
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), OPERATOR_COUNT);
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for &id in OperatorId::all() {
            let parsed: OperatorId = id.as_str().parse().expect("parse back");
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OperatorId::AmlCheckV2).unwrap();
        assert_eq!(json, "\"AML_CHECK_V2\"");
        let json = serde_json::to_string(&OperatorId::InCaseInsensitive).unwrap();
        assert_eq!(json, "\"IN_CASE_INSENSITIVE\"");
    }

    #[test]
    fn serde_matches_as_str_for_all_operators() {
        for &id in OperatorId::all() {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            let back: OperatorId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "NOT_AN_OPERATOR".parse::<OperatorId>().unwrap_err();
        assert_eq!(err.0, "NOT_AN_OPERATOR");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(OperatorId::Gte.to_string(), "GTE");
        assert_eq!(
            OperatorId::CompanySanctionsCategories.to_string(),
            "COMPANY_SANCTIONS_CATEGORIES"
        );
    }
}
