//! Backend collaborators: relational store, document store and identity.
//!
//! Only the operations this crate needs are modelled. Concrete SDK bindings
//! live with the application; tests use in-memory fakes.

use crate::core::poster::PosterOverrides;
use crate::models::account::AuthUser;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Profile collection in the document store.
pub const PROFILE_COLLECTION: &str = "users";

/// Profile field holding the poster override map.
pub const POSTER_OVERRIDES_FIELD: &str = "selectedPosters";

/// Failure reported by a data store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Failure reported by the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("credential requires a recent login")]
    RequiresRecentLogin,

    #[error("{0}")]
    Other(String),
}

/// Table-oriented store (Supabase).
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Delete every row of `table` where `column == value`; returns rows removed.
    async fn delete_where(&self, table: &str, column: &str, value: &str) -> Result<u64, StoreError>;
}

/// Document store (Firestore).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of at most `limit` documents in `collection` with `field == value`.
    async fn query_ids(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Delete several documents in one atomic batch.
    async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<(), StoreError>;

    /// Delete a single document; returns whether it existed.
    /// Deleting a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Read a single document.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Map<String, Value>>, StoreError>;
}

/// Authentication provider (Firebase Auth).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Delete the credential of the signed-in user.
    async fn delete_credential(&self, user: &AuthUser) -> Result<(), IdentityError>;
}

/// Load the poster overrides stored on a user's profile.
///
/// A missing profile or field yields an empty map; non-string values are skipped.
pub async fn load_poster_overrides(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<PosterOverrides, StoreError> {
    let Some(profile) = store.get_document(PROFILE_COLLECTION, user_id).await? else {
        return Ok(PosterOverrides::new());
    };

    let overrides: HashMap<String, String> = profile
        .get(POSTER_OVERRIDES_FIELD)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    tracing::debug!("Loaded {} poster overrides for {}", overrides.len(), user_id);
    Ok(overrides.into())
}
