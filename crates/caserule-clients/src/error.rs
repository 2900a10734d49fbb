//! Collaborator client error types.

/// Errors from workflow-helper and entity-matching calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The requested end-user does not exist.
    #[error("end user not found: {id}")]
    EndUserNotFound { id: String },
    /// Client configuration error.
    #[error("client configuration error: {reason}")]
    NotConfigured { reason: String },
}
