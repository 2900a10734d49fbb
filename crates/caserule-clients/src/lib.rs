//! # caserule-clients — External Collaborator Interfaces
//!
//! The rule engine consumes two external collaborators; this crate defines
//! their trait interfaces, typed payloads, and implementations:
//!
//! - [`WorkflowHelpers`] — case-data helper resolving related end-users
//!   (UBOs, directors, representatives) by identifier, with their stored
//!   AML screening hits.
//! - [`EntityMatchingClient`] — the name-similarity scoring service used
//!   by fuzzy-match rules.
//!
//! ## Architecture
//!
//! Traits are `Send + Sync` and object-safe so the engine can hold them
//! behind `&dyn` references shared across async tasks. The HTTP
//! implementation wraps a `reqwest::Client` with the service base URL,
//! bearer authentication, and request/response mapping; in-memory
//! implementations back tests and local development.
//!
//! ## Error Handling
//!
//! HTTP failures are mapped to [`ClientError`] with diagnostic context
//! including the endpoint, HTTP status, and response body excerpt.
//!
//! ## Timeout & Retry
//!
//! The HTTP client uses a per-request timeout (configurable, default 30s)
//! and retries transient transport errors with exponential backoff. The
//! engine's operators never retry — policy lives here, with the client.

pub mod error;
pub mod helpers;
pub mod matching;
mod retry;
pub mod types;

// Re-export primary types for ergonomic imports.
pub use error::ClientError;
pub use helpers::{InMemoryWorkflowHelpers, WorkflowHelpers};
pub use matching::{
    EntityMatchingClient, EntityMatchingConfig, FixedScoreMatchingClient, HttpEntityMatchingClient,
};
pub use types::{AmlHit, EndUser, EntityMatchingData, EntityMatchingRequest, EntityMatchingResponse};
