//! Upstash Vector REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{FetchedItem, QueryMatch, QueryRequest, UpsertItem, VectorIndex};
use crate::error::{IndexError, IndexResult};

/// Default timeout for a single index request.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an Upstash Vector index.
#[derive(Debug, Clone)]
pub struct UpstashConfig {
    /// REST endpoint, e.g. `https://example-vector.upstash.io`.
    pub url: String,
    /// REST bearer token.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl UpstashConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// [`VectorIndex`] backed by the Upstash Vector REST API.
pub struct UpstashIndex {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    data: &'a str,
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    filter: &'a str,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<String>,
}

impl UpstashIndex {
    /// Build a client. Fails only if the TLS backend cannot be initialized.
    pub fn new(config: UpstashConfig) -> IndexResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn endpoint(&self, command: &str, namespace: &str) -> String {
        if namespace.is_empty() {
            format!("{}/{command}", self.base_url)
        } else {
            format!("{}/{command}/{namespace}", self.base_url)
        }
    }

    async fn post<B, T>(&self, command: &str, namespace: &str, body: &B) -> IndexResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(command, namespace);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                IndexError::Decode(e.to_string())
            } else {
                IndexError::Upstream {
                    status: status.as_u16(),
                    message: text.clone(),
                }
            }
        })?;

        if !status.is_success() || envelope.error.is_some() {
            return Err(IndexError::Upstream {
                status: status.as_u16(),
                message: envelope.error.unwrap_or_else(|| status.to_string()),
            });
        }

        envelope
            .result
            .ok_or_else(|| IndexError::Decode(format!("{command}: missing result")))
    }
}

#[async_trait]
impl VectorIndex for UpstashIndex {
    async fn upsert(&self, items: Vec<UpsertItem>, namespace: &str) -> IndexResult<()> {
        let count = items.len();
        let _: Value = self.post("upsert-data", namespace, &items).await?;
        log::info!("Upserted {count} documents into namespace {namespace:?}");
        Ok(())
    }

    async fn query(&self, request: QueryRequest, namespace: &str) -> IndexResult<Vec<QueryMatch>> {
        let filter = request.filter.render();
        let body = QueryBody {
            data: &request.text,
            top_k: request.top_k,
            include_metadata: request.include_metadata,
            filter: &filter,
        };
        log::debug!("Query top_k={} filter={filter:?}", request.top_k);
        self.post("query-data", namespace, &body).await
    }

    async fn fetch(&self, ids: &[String], namespace: &str) -> IndexResult<Vec<FetchedItem>> {
        let body = json!({ "ids": ids, "includeMetadata": true });
        let items: Vec<Option<FetchedItem>> = self.post("fetch", namespace, &body).await?;
        Ok(items.into_iter().flatten().collect())
    }
}
