//! # Workflow Case-Data Helpers
//!
//! The workflow service owns end-user records (natural persons related to
//! a case: UBOs, directors, representatives) and their stored AML
//! screening hits. The engine resolves related parties through this trait
//! during AML aggregation; it never queries the workflow store directly.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::EndUser;

/// Adapter trait for workflow case-data lookups.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime selection (in-memory vs. live).
#[async_trait]
pub trait WorkflowHelpers: Send + Sync {
    /// Resolve an end-user by workflow-service identifier, including the
    /// AML hits stored against them.
    async fn get_end_user_by_id(&self, id: &str) -> Result<EndUser, ClientError>;
}

/// In-memory workflow helpers for testing and development.
///
/// Returns the fixture end-users registered at construction; unknown ids
/// produce [`ClientError::EndUserNotFound`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowHelpers {
    users: HashMap<String, EndUser>,
}

impl InMemoryWorkflowHelpers {
    /// Create an empty helper set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture end-user, keyed by its id.
    pub fn with_user(mut self, user: EndUser) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }
}

#[async_trait]
impl WorkflowHelpers for InMemoryWorkflowHelpers {
    async fn get_end_user_by_id(&self, id: &str) -> Result<EndUser, ClientError> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::EndUserNotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AmlHit;

    #[tokio::test]
    async fn returns_registered_user() {
        let helpers = InMemoryWorkflowHelpers::new().with_user(
            EndUser::new("eu_1").with_aml_hits(vec![AmlHit {
                countries: vec!["IR".into()],
                ..AmlHit::default()
            }]),
        );
        let user = helpers.get_end_user_by_id("eu_1").await.unwrap();
        assert_eq!(user.aml_hits.len(), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let helpers = InMemoryWorkflowHelpers::new();
        let err = helpers.get_end_user_by_id("eu_missing").await.unwrap_err();
        assert!(matches!(err, ClientError::EndUserNotFound { ref id } if id == "eu_missing"));
    }
}
