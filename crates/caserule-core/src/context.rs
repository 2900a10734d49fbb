//! # Case Context — Workflow Case Data & Path Resolution
//!
//! [`CaseContext`] wraps the nested JSON case document produced by a
//! KYC/KYB workflow run. The engine reads it, never writes it: the
//! document is owned by the workflow layer and discarded after
//! evaluation.
//!
//! ## Path Semantics
//!
//! Paths are dot-separated (`"entity.data.additionalInfo"`). A segment
//! that parses as an unsigned integer indexes into an array
//! (`"ubos.0.firstName"`). Resolution to JSON `null` is reported as
//! absence — a rule's required field is either present with a value or
//! missing, never "present but null".

use serde_json::Value;

/// The in-memory case document for one workflow run.
///
/// Read-only input to the rule engine. Cheap to construct from any
/// `serde_json::Value`; resolution borrows from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseContext(Value);

impl CaseContext {
    /// Wrap a materialized case document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Access the raw case document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Resolve a dot-separated path against the case document.
    ///
    /// Returns `None` when any segment is missing, when an array segment
    /// is not a valid index, or when the final value is JSON `null`.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.0, path)
    }
}

impl From<Value> for CaseContext {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Resolve a dot-separated path against an arbitrary JSON value.
///
/// Shared by [`CaseContext::resolve`] and by operators that resolve
/// sub-paths within already-extracted records (e.g. a path inside a
/// single AML hit).
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
