//! # Compiled Shapes & Structured Violations
//!
//! Wraps the `jsonschema` crate behind a small compile-once / check-many
//! surface. Shapes are inline schema documents (no file loading, no
//! cross-schema `$ref`), so compilation failures indicate a programming
//! error in a shape definition and surface as [`SchemaError::BuildError`].

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Error during shape compilation or instance checking.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The instance did not conform to the shape.
    #[error("value rejected by shape '{shape_name}':\n{violations}")]
    ShapeMismatch {
        /// Name of the shape that was checked.
        shape_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The shape document itself could not be compiled.
    #[error("shape build error for '{shape_name}': {reason}")]
    BuildError {
        /// Shape name.
        shape_name: String,
        /// Reason the validator could not be compiled.
        reason: String,
    },
}

impl SchemaError {
    /// The violations carried by a `ShapeMismatch`, if any.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ShapeMismatch { violations, .. } => Some(violations),
            Self::BuildError { .. } => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A named, compiled shape validator.
///
/// Compiled once (at operator construction) and checked many times.
/// Immutable after construction — safe to share across threads by `&`.
pub struct CompiledShape {
    name: String,
    validator: jsonschema::Validator,
}

impl fmt::Debug for CompiledShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShape")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CompiledShape {
    /// Compile a shape document under Draft 2020-12.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::BuildError`] if the document is not a valid
    /// schema. Shape documents ship with the engine, so this indicates a
    /// defect in a shape definition rather than bad input.
    pub fn compile(name: impl Into<String>, schema: &Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(schema)
            .map_err(|e| SchemaError::BuildError {
                shape_name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { name, validator })
    }

    /// The shape's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fast boolean conformance check, no diagnostics.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Check an instance, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ShapeMismatch`] with the full violation list
    /// if the instance does not conform.
    pub fn check(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ShapeMismatch {
                shape_name: self.name.clone(),
                violations: ValidationViolations { violations },
            })
        }
    }
}
