//! # Entity Matching Client — Name Similarity Scoring
//!
//! The entity-matching service scores the similarity of two entity names
//! (0–100). Fuzzy-match rules delegate all approximate comparison to it;
//! the engine itself never computes string distances.
//!
//! The HTTP implementation wraps a `reqwest::Client` with the service
//! base URL, bearer authentication, a per-request timeout, and transport
//! retry. Caching is deliberately absent — score freshness is the
//! service's concern.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::retry::retry_send;
use crate::types::{EntityMatchingData, EntityMatchingRequest, EntityMatchingResponse};

/// Adapter trait for the entity-matching service.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime selection (fixed-score vs. live).
#[async_trait]
pub trait EntityMatchingClient: Send + Sync {
    /// Score the similarity of the two entity names in the request.
    async fn run_entity_matching_v2(
        &self,
        request: &EntityMatchingRequest,
    ) -> Result<EntityMatchingResponse, ClientError>;
}

/// Configuration for the HTTP entity-matching client.
#[derive(Debug, Clone)]
pub struct EntityMatchingConfig {
    /// Base URL of the entity-matching API (e.g. `https://matching.internal/api/v1`).
    pub base_url: String,
    /// Bearer token for service authentication.
    pub api_key: String,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl EntityMatchingConfig {
    /// Create a new configuration with default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }
}

/// Real HTTP client for the entity-matching service.
#[derive(Debug)]
pub struct HttpEntityMatchingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEntityMatchingClient {
    /// Create a new client from configuration.
    pub fn new(config: EntityMatchingConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                        .map_err(|_| ClientError::NotConfigured {
                            reason: "invalid API key characters".into(),
                        })?,
                );
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ClientError::NotConfigured {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl EntityMatchingClient for HttpEntityMatchingClient {
    async fn run_entity_matching_v2(
        &self,
        request: &EntityMatchingRequest,
    ) -> Result<EntityMatchingResponse, ClientError> {
        let url = format!("{}/entity-matching/v2", self.base_url);

        let resp = retry_send(|| self.client.post(&url).json(request).send())
            .await
            .map_err(|e| ClientError::Http {
                endpoint: url.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                endpoint: url,
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<EntityMatchingResponse>()
            .await
            .map_err(|e| ClientError::Deserialization {
                endpoint: url,
                source: e,
            })
    }
}

/// Fixed-score matching client for testing and development.
///
/// Always returns the configured score (or a scoreless response, to
/// exercise the missing-score path).
#[derive(Debug, Clone)]
pub struct FixedScoreMatchingClient {
    score: Option<f64>,
}

impl FixedScoreMatchingClient {
    /// A client that always reports the given similarity score.
    pub fn new(score: f64) -> Self {
        Self { score: Some(score) }
    }

    /// A client whose responses lack a similarity score entirely.
    pub fn missing_score() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl EntityMatchingClient for FixedScoreMatchingClient {
    async fn run_entity_matching_v2(
        &self,
        _request: &EntityMatchingRequest,
    ) -> Result<EntityMatchingResponse, ClientError> {
        Ok(EntityMatchingResponse {
            data: EntityMatchingData {
                similarity_score: self.score,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_score_client_echoes_configured_score() {
        let client = FixedScoreMatchingClient::new(72.5);
        let resp = client
            .run_entity_matching_v2(&EntityMatchingRequest {
                entity1: "Acme Holdings Ltd".into(),
                entity2: "ACME Holding Limited".into(),
                include_analysis: false,
            })
            .await
            .unwrap();
        assert_eq!(resp.data.similarity_score, Some(72.5));
    }

    #[tokio::test]
    async fn missing_score_client_omits_score() {
        let client = FixedScoreMatchingClient::missing_score();
        let resp = client
            .run_entity_matching_v2(&EntityMatchingRequest {
                entity1: "a".into(),
                entity2: "b".into(),
                include_analysis: false,
            })
            .await
            .unwrap();
        assert_eq!(resp.data.similarity_score, None);
    }
}
