//! # Fuzzy Name Similarity
//!
//! Delegates approximate name comparison to the external entity-matching
//! service. The operator itself only guards the threshold, issues one
//! call, and compares the returned score — caching, retry, and timeout
//! policy belong to the injected client.

use async_trait::async_trait;
use serde_json::Value;

use caserule_clients::EntityMatchingRequest;
use caserule_core::OperatorId;
use caserule_schema::{shapes, CompiledShape};

use crate::error::RuleError;
use crate::operator::{compile_shape, Operator, OperatorDeps};

/// True iff the similarity score of the two extracted names is strictly
/// below the injected threshold (0–100).
///
/// The two names arrive through path-comparison extraction: the rule's
/// key resolves the first entity name and the rule's value (a second
/// path) resolves the other.
#[derive(Debug)]
pub struct FuzzyMatchScoreLt {
    condition_shape: CompiledShape,
    data_shape: CompiledShape,
}

impl FuzzyMatchScoreLt {
    pub fn new() -> Result<Self, RuleError> {
        let id = OperatorId::FuzzyMatchScoreLt;
        Ok(Self {
            condition_shape: compile_shape(id, "entity-name", &shapes::non_empty_string())?,
            data_shape: compile_shape(id, "entity-name", &shapes::non_empty_string())?,
        })
    }
}

#[async_trait]
impl Operator for FuzzyMatchScoreLt {
    fn id(&self) -> OperatorId {
        OperatorId::FuzzyMatchScoreLt
    }

    fn condition_shape(&self) -> Option<&CompiledShape> {
        Some(&self.condition_shape)
    }

    fn data_shape(&self) -> Option<&CompiledShape> {
        Some(&self.data_shape)
    }

    async fn evaluate(
        &self,
        data_value: &Value,
        condition_value: &Value,
        deps: &OperatorDeps<'_>,
    ) -> Result<bool, RuleError> {
        let id = self.id();

        // Threshold problems must surface before any network call.
        let threshold = deps
            .threshold
            .ok_or_else(|| RuleError::Other("threshold option is required for FUZZY_MATCH_SCORE_LT".into()))?;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(RuleError::Other(format!(
                "threshold must be within 0-100, got {threshold}"
            )));
        }

        let client = deps
            .matching
            .ok_or_else(|| RuleError::Other("entity matching client is not configured".into()))?;

        let entity1 = data_value
            .as_str()
            .ok_or_else(|| RuleError::validation_msg(id, "expected an entity name string"))?;
        let entity2 = condition_value
            .as_str()
            .ok_or_else(|| RuleError::validation_msg(id, "expected an entity name string"))?;

        let response = client
            .run_entity_matching_v2(&EntityMatchingRequest {
                entity1: entity1.to_string(),
                entity2: entity2.to_string(),
                include_analysis: false,
            })
            .await?;

        // Zero is a valid score; only absence is an error.
        let score = response.data.similarity_score.ok_or_else(|| {
            RuleError::Other("similarity score missing from entity matching response".into())
        })?;

        Ok(score < threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caserule_clients::{
        ClientError, EntityMatchingClient, EntityMatchingResponse, FixedScoreMatchingClient,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A client that records whether it was ever called.
    #[derive(Debug, Default)]
    struct RecordingClient {
        called: AtomicBool,
    }

    #[async_trait]
    impl EntityMatchingClient for RecordingClient {
        async fn run_entity_matching_v2(
            &self,
            _request: &EntityMatchingRequest,
        ) -> Result<EntityMatchingResponse, ClientError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(EntityMatchingResponse {
                data: caserule_clients::EntityMatchingData {
                    similarity_score: Some(50.0),
                },
            })
        }
    }

    fn deps<'a>(
        client: &'a dyn EntityMatchingClient,
        threshold: Option<f64>,
    ) -> OperatorDeps<'a> {
        OperatorDeps {
            matching: Some(client),
            threshold,
            ..OperatorDeps::none()
        }
    }

    #[tokio::test]
    async fn score_below_threshold_is_true() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = FixedScoreMatchingClient::new(40.0);
        let verdict = op
            .evaluate(&json!("Acme Ltd"), &json!("Acme Limited"), &deps(&client, Some(50.0)))
            .await
            .unwrap();
        assert!(verdict);
    }

    #[tokio::test]
    async fn score_at_or_above_threshold_is_false() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = FixedScoreMatchingClient::new(60.0);
        let verdict = op
            .evaluate(&json!("Acme Ltd"), &json!("Acme Limited"), &deps(&client, Some(50.0)))
            .await
            .unwrap();
        assert!(!verdict);

        let client = FixedScoreMatchingClient::new(50.0);
        let verdict = op
            .evaluate(&json!("Acme Ltd"), &json!("Acme Limited"), &deps(&client, Some(50.0)))
            .await
            .unwrap();
        assert!(!verdict);
    }

    #[tokio::test]
    async fn out_of_range_threshold_fails_before_the_call() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = RecordingClient::default();
        let err = op
            .evaluate(&json!("a"), &json!("b"), &deps(&client, Some(150.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::Other(_)));
        assert!(!client.called.load(Ordering::SeqCst), "client must not be called");
    }

    #[tokio::test]
    async fn missing_threshold_fails_before_the_call() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = RecordingClient::default();
        let err = op
            .evaluate(&json!("a"), &json!("b"), &deps(&client, None))
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::Other(_)));
        assert!(!client.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn zero_score_is_a_score_not_an_absence() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = FixedScoreMatchingClient::new(0.0);
        let verdict = op
            .evaluate(&json!("a"), &json!("b"), &deps(&client, Some(50.0)))
            .await
            .unwrap();
        assert!(verdict);
    }

    #[tokio::test]
    async fn missing_score_is_an_error() {
        let op = FuzzyMatchScoreLt::new().unwrap();
        let client = FixedScoreMatchingClient::missing_score();
        let err = op
            .evaluate(&json!("a"), &json!("b"), &deps(&client, Some(50.0)))
            .await
            .unwrap_err();
        match err {
            RuleError::Other(message) => assert!(message.contains("similarity score")),
            other => panic!("expected ad-hoc error, got: {other}"),
        }
    }
}
