//! # caserule-engine — The Risk Rule Engine
//!
//! A library of typed condition operators that evaluate compliance and
//! fraud rules — AML hits, sanctions categories, UBO mismatches, fuzzy
//! name similarity, numeric/date comparisons — against arbitrary, deeply
//! nested case data produced by a KYC/KYB workflow.
//!
//! ## Contract
//!
//! Every operator implements the same four-step contract
//! (see [`Operator`]):
//!
//! ```text
//! extract_value(context, rule, deps)  → DataValue
//! validate(data, condition)           → shape check, fail fast
//! evaluate(data, condition, deps)     → bool
//! execute(data, condition, deps)      = validate + evaluate
//! ```
//!
//! Consumers follow the two-step sequence — extract, then execute — or
//! call [`OperatorRegistry::evaluate_rule`] for both at once:
//!
//! ```no_run
//! # async fn example() -> Result<(), caserule_engine::RuleError> {
//! use caserule_core::{CaseContext, OperatorId, Rule};
//! use caserule_engine::{OperatorDeps, OperatorRegistry};
//! use serde_json::json;
//!
//! let registry = OperatorRegistry::new()?;
//! let context = CaseContext::new(json!({ "entity": { "data": { "country": "DE" } } }));
//! let rule = Rule::with_key("entity.data.country", OperatorId::In, json!(["IR", "KP"]));
//!
//! let flagged = registry
//!     .evaluate_rule(&rule, &context, &OperatorDeps::none())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Operators are immutable singletons: the registry is built once at
//! process start and shared by `&` across any number of concurrent
//! evaluations. The only async work is the operators' own collaborator
//! calls (parallel end-user fetch, one matching call per fuzzy rule);
//! `execute` is uniformly async so callers never special-case sync
//! versus async operators.

pub mod aml;
pub mod error;
pub mod fuzzy;
pub mod idv;
pub mod operator;
pub mod primitives;
pub mod registry;
pub mod sanctions;
pub mod ubo;

// Re-export primary types for ergonomic imports.
pub use aml::{AmlCheck, AmlCheckV2};
pub use error::RuleError;
pub use fuzzy::FuzzyMatchScoreLt;
pub use idv::IdvCheck;
pub use operator::{Operator, OperatorDeps};
pub use primitives::{
    Between, Equals, Exists, GreaterThan, GreaterThanOrEqual, In, InCaseInsensitive, LastYear,
    LessThan, LessThanOrEqual, NotEquals, NotIn,
};
pub use registry::OperatorRegistry;
pub use sanctions::CompanySanctionsCategories;
pub use ubo::UboMismatch;
