//! In-process [`VectorIndex`] used for tests and offline runs.
//!
//! Scores are the fraction of query terms found in the stored text, which is
//! enough to exercise ranking, `top_k`, and metadata filtering.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{FetchedItem, QueryMatch, QueryRequest, UpsertItem, VectorIndex};
use crate::error::IndexResult;

#[derive(Default)]
struct Namespace {
    order: Vec<String>,
    items: HashMap<String, UpsertItem>,
}

/// A term-overlap index held in memory.
#[derive(Default)]
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, Namespace>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(namespace)
            .map(|ns| ns.items.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn score(query_terms: &[String], data: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let haystack = terms(data);
    let hits = query_terms
        .iter()
        .filter(|term| haystack.contains(term))
        .count();
    hits as f64 / query_terms.len() as f64
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, items: Vec<UpsertItem>, namespace: &str) -> IndexResult<()> {
        let mut namespaces = self.namespaces.write().unwrap_or_else(|e| e.into_inner());
        let ns = namespaces.entry(namespace.to_string()).or_default();
        for item in items {
            if !ns.items.contains_key(&item.id) {
                ns.order.push(item.id.clone());
            }
            ns.items.insert(item.id.clone(), item);
        }
        Ok(())
    }

    async fn query(&self, request: QueryRequest, namespace: &str) -> IndexResult<Vec<QueryMatch>> {
        let namespaces = self.namespaces.read().unwrap_or_else(|e| e.into_inner());
        let Some(ns) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let query_terms = terms(&request.text);
        let mut matches: Vec<QueryMatch> = ns
            .order
            .iter()
            .filter_map(|id| ns.items.get(id))
            .filter(|item| request.filter.matches(&item.metadata))
            .map(|item| QueryMatch {
                id: item.id.clone(),
                score: score(&query_terms, &item.data),
                metadata: request.include_metadata.then(|| item.metadata.clone()),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(request.top_k);
        Ok(matches)
    }

    async fn fetch(&self, ids: &[String], namespace: &str) -> IndexResult<Vec<FetchedItem>> {
        let namespaces = self.namespaces.read().unwrap_or_else(|e| e.into_inner());
        let Some(ns) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| ns.items.get(id))
            .map(|item| FetchedItem {
                id: item.id.clone(),
                metadata: Some(item.metadata.clone()),
            })
            .collect())
    }
}
