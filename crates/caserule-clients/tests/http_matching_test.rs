//! # Integration Tests for the Entity-Matching HTTP Client
//!
//! Runs `HttpEntityMatchingClient` against wiremock servers to verify
//! request construction, authentication headers, response parsing, and
//! error mapping without a live matching service.

use caserule_clients::{
    ClientError, EntityMatchingClient, EntityMatchingConfig, EntityMatchingRequest,
    HttpEntityMatchingClient,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpEntityMatchingClient {
    let config = EntityMatchingConfig::new(server.uri(), "test-api-key");
    HttpEntityMatchingClient::new(config).expect("client build")
}

fn request() -> EntityMatchingRequest {
    EntityMatchingRequest {
        entity1: "Acme Holdings Ltd".into(),
        entity2: "ACME Holding Limited".into(),
        include_analysis: false,
    }
}

#[tokio::test]
async fn matching_success_parses_score() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entity-matching/v2"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "entity1": "Acme Holdings Ltd",
            "entity2": "ACME Holding Limited",
            "includeAnalysis": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "similarityScore": 87.5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server)
        .run_entity_matching_v2(&request())
        .await
        .expect("matching call");
    assert_eq!(resp.data.similarity_score, Some(87.5));
}

#[tokio::test]
async fn matching_zero_score_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entity-matching/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "similarityScore": 0.0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server)
        .run_entity_matching_v2(&request())
        .await
        .expect("matching call");
    // Zero is a real score, not a missing one.
    assert_eq!(resp.data.similarity_score, Some(0.0));
}

#[tokio::test]
async fn matching_scoreless_response_deserializes_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entity-matching/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server)
        .run_entity_matching_v2(&request())
        .await
        .expect("matching call");
    assert_eq!(resp.data.similarity_score, None);
}

#[tokio::test]
async fn matching_api_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entity-matching/v2"))
        .respond_with(ResponseTemplate::new(422).set_body_string("entity1 must not be empty"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .run_entity_matching_v2(&request())
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, body, .. } => {
            assert_eq!(status, 422);
            assert!(body.contains("entity1"));
        }
        other => panic!("expected Api error, got: {other}"),
    }
}

#[tokio::test]
async fn matching_malformed_body_is_a_deserialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entity-matching/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .run_entity_matching_v2(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Deserialization { .. }));
}
