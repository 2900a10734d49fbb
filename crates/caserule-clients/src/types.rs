//! Typed payloads exchanged with the external collaborators.
//!
//! Wire format is camelCase throughout, matching the workflow service and
//! the entity-matching API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One AML screening hit stored against an end-user.
///
/// Hits are sourced from watchlist/PEP/sanctions/adverse-media vendors.
/// The per-source match detail arrays (`pep`, `sanctions`, …) keep their
/// vendor-specific structure as raw JSON; the engine only resolves paths
/// into them, it never interprets the vendor records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmlHit {
    /// The watchlist name that matched, when the vendor reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    /// Vendor match-type labels (e.g. `"name_exact"`, `"aka_fuzzy"`).
    pub match_types: Vec<String>,
    /// ISO country codes associated with the matched party.
    pub countries: Vec<String>,
    /// Politically-exposed-person source records.
    pub pep: Vec<Value>,
    /// Sanctions source records.
    pub sanctions: Vec<Value>,
    /// Adverse media source records.
    pub adverse_media: Vec<Value>,
    /// Fitness & probity source records.
    pub fitness_probity: Vec<Value>,
    /// Warning-list source records.
    pub warnings: Vec<Value>,
    /// Source records outside the named categories.
    pub other: Vec<Value>,
}

/// A related end-user (natural person) known to the workflow service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUser {
    /// Workflow-service identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// AML screening hits stored against this end-user.
    #[serde(default)]
    pub aml_hits: Vec<AmlHit>,
}

impl EndUser {
    /// Create an end-user with no stored hits.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            aml_hits: Vec::new(),
        }
    }

    /// Attach stored AML hits.
    pub fn with_aml_hits(mut self, hits: Vec<AmlHit>) -> Self {
        self.aml_hits = hits;
        self
    }
}

/// Request payload for the entity-matching (name similarity) service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatchingRequest {
    /// First entity name.
    pub entity1: String,
    /// Second entity name.
    pub entity2: String,
    /// Whether the service should return its per-token analysis.
    pub include_analysis: bool,
}

/// Response envelope from the entity-matching service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatchingResponse {
    pub data: EntityMatchingData,
}

/// Similarity payload.
///
/// `similarity_score` stays an `Option` so a missing score is
/// distinguishable from a legitimate score of zero — callers must treat
/// absence as an error, never as "no similarity".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatchingData {
    /// Similarity score in 0–100, when the service produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aml_hit_deserializes_sparse_vendor_payload() {
        let hit: AmlHit = serde_json::from_value(json!({
            "matchedName": "ACME HOLDINGS",
            "countries": ["IR"]
        }))
        .unwrap();
        assert_eq!(hit.matched_name.as_deref(), Some("ACME HOLDINGS"));
        assert_eq!(hit.countries, vec!["IR"]);
        assert!(hit.sanctions.is_empty());
    }

    #[test]
    fn end_user_camel_case_round_trip() {
        let user = EndUser {
            id: "eu_1".into(),
            first_name: Some("Jane".into()),
            last_name: Some("Smith".into()),
            aml_hits: vec![AmlHit::default()],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("amlHits").is_some());
        let back: EndUser = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn similarity_score_zero_is_not_missing() {
        let resp: EntityMatchingResponse =
            serde_json::from_value(json!({"data": {"similarityScore": 0.0}})).unwrap();
        assert_eq!(resp.data.similarity_score, Some(0.0));

        let resp: EntityMatchingResponse =
            serde_json::from_value(json!({"data": {}})).unwrap();
        assert_eq!(resp.data.similarity_score, None);
    }
}
