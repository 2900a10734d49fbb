//! # Rule Evaluation Errors
//!
//! Two structured failure classes cover the engine's fail-fast contract:
//! a required path missing from case data ([`RuleError::DataValueNotFound`])
//! and a condition or data value rejected by its shape
//! ([`RuleError::ValidationFailed`], carrying the schema diagnostic).
//! Collaborator failures propagate through [`RuleError::Client`].
//!
//! A handful of operator conditions raise plain untyped errors instead
//! ([`RuleError::Other`]): IdvCheck's "No decisions found", the fuzzy
//! matcher's threshold-range guard, and missing-dependency conditions.
//! These stay outside the structured taxonomy on purpose — callers that
//! classify failures by kind depend on the distinction.

use caserule_clients::ClientError;
use caserule_core::OperatorId;
use caserule_schema::SchemaError;
use thiserror::Error;

/// Errors raised during rule extraction, validation, or evaluation.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A required path or key is absent from the case data. The rule
    /// cannot be evaluated; the caller decides its fail-safe policy.
    #[error("data value not found for {operator}: {path}")]
    DataValueNotFound {
        /// The operator whose extraction failed.
        operator: OperatorId,
        /// The missing path, as resolved against the case context.
        path: String,
    },

    /// A condition value or extracted data value failed its shape.
    #[error("validation failed for {operator}: {message}")]
    ValidationFailed {
        /// The operator whose validation failed.
        operator: OperatorId,
        /// Human-readable diagnostic, including rendered violations.
        message: String,
        /// The underlying schema diagnostic, when the failure came from
        /// a compiled shape.
        #[source]
        cause: Option<SchemaError>,
    },

    /// A collaborator call failed (end-user fetch, matching call).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Ad-hoc untyped error (see module docs).
    #[error("{0}")]
    Other(String),
}

impl RuleError {
    /// A validation failure sourced from a schema diagnostic.
    pub fn validation(operator: OperatorId, cause: SchemaError) -> Self {
        Self::ValidationFailed {
            operator,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// A validation failure with a plain message (no schema diagnostic).
    pub fn validation_msg(operator: OperatorId, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            operator,
            message: message.into(),
            cause: None,
        }
    }

    /// A missing required path, named as resolved against the context.
    pub fn not_found(operator: OperatorId, path: impl Into<String>) -> Self {
        Self::DataValueNotFound {
            operator,
            path: path.into(),
        }
    }
}
