//! # caserule-schema — Shape Validation
//!
//! Runtime validation of untrusted JSON condition and data values against
//! JSON Schema definitions (Draft 2020-12).
//!
//! ## Why runtime validation
//!
//! Rule configuration and case data both cross a trust boundary: rules are
//! authored in an external store, and case documents are assembled from
//! vendor responses and user input. Every operator therefore validates the
//! shapes of both sides before evaluating — a malformed condition or data
//! value must be rejected with a structured diagnostic, never coerced.
//!
//! ## Design
//!
//! [`CompiledShape`] compiles one schema document at operator construction
//! time and is immutable afterwards; checking an instance is lock-free and
//! safe from any thread. Violations are reported as
//! [`Violation`]/[`ValidationViolations`] with the JSON Pointer path to the
//! offending field, the schema path that rejected it, and a human-readable
//! message.
//!
//! The [`shapes`] module holds the shared library of shape documents used
//! by the operators (primitives, ranges, category thresholds, nested
//! condition envelopes, …).

pub mod shapes;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use validate::{CompiledShape, SchemaError, ValidationViolations, Violation};
