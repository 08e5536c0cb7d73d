//! The vector index collaborator contract.

pub mod memory;
pub mod upstash;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IndexResult;
use crate::filter::Filter;

/// A document to embed and store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertItem {
    /// Unique document id.
    pub id: String,
    /// Raw text the index embeds.
    pub data: String,
    /// Metadata stored with the vector.
    pub metadata: Value,
}

/// A similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Query text to embed.
    pub text: String,
    /// Maximum number of matches to return.
    pub top_k: usize,
    /// Whether matches should carry their metadata.
    pub include_metadata: bool,
    /// Metadata filter; empty matches everything.
    pub filter: Filter,
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A document returned by id lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Remote (or local) vector similarity index.
///
/// Implementations perform no retries; callers see the first failure.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace documents in `namespace`.
    async fn upsert(&self, items: Vec<UpsertItem>, namespace: &str) -> IndexResult<()>;

    /// Run a similarity query in `namespace`, best match first.
    async fn query(&self, request: QueryRequest, namespace: &str) -> IndexResult<Vec<QueryMatch>>;

    /// Look documents up by id. Unknown ids are omitted from the result.
    async fn fetch(&self, ids: &[String], namespace: &str) -> IndexResult<Vec<FetchedItem>>;
}
