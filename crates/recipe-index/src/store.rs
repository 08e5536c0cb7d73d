//! Recipe search and lookup over a [`VectorIndex`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::IndexResult;
use crate::filter::Filter;
use crate::index::{QueryMatch, QueryRequest, VectorIndex};
use crate::recipe::Recipe;

/// Namespace recipes are stored under.
pub const DEFAULT_NAMESPACE: &str = "recipes-namespace";

/// Number of recipes sent per upsert request.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Default number of search results.
const DEFAULT_MAX_RESULTS: usize = 10;

/// Search parameters accepted by [`RecipeStore::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Free-text description of the dish.
    pub query: String,
    /// Match recipes containing at least one of these ingredients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_carbohydrates: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<f64>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ingredients: None,
            max_calories: None,
            max_total_fat: None,
            max_carbohydrates: None,
            max_protein: None,
            max_minutes: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Translate the numeric limits and ingredient list into a metadata filter.
    pub fn to_filter(&self) -> IndexResult<Filter> {
        let bounds = [
            ("minutes", self.max_minutes),
            ("nutrition.calories", self.max_calories),
            ("nutrition.protein", self.max_protein),
            ("nutrition.totalFat", self.max_total_fat),
            ("nutrition.carbohydrates", self.max_carbohydrates),
        ];

        // A zero limit means "no limit".
        let mut filter = Filter::new();
        for (field, bound) in bounds {
            if let Some(value) = bound.filter(|v| *v != 0.0) {
                filter = filter.less_than(field, value)?;
            }
        }
        if let Some(ingredients) = &self.ingredients {
            filter = filter.contains_any("ingredients", ingredients.as_slice())?;
        }
        Ok(filter)
    }
}

/// Recipe operations over a shared index handle.
#[derive(Clone)]
pub struct RecipeStore {
    index: Arc<dyn VectorIndex>,
    namespace: String,
}

impl RecipeStore {
    /// Create a store using [`DEFAULT_NAMESPACE`].
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self::with_namespace(index, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(index: Arc<dyn VectorIndex>, namespace: impl Into<String>) -> Self {
        Self {
            index,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Upsert recipes in batches of [`UPSERT_BATCH_SIZE`]. Returns the count written.
    pub async fn index_recipes(&self, recipes: &[Recipe]) -> IndexResult<usize> {
        let mut written = 0;
        for batch in recipes.chunks(UPSERT_BATCH_SIZE) {
            let items = batch.iter().map(Recipe::to_upsert_item).collect();
            self.index.upsert(items, &self.namespace).await?;
            written += batch.len();
            log::info!("Processed {written} recipes...");
        }
        Ok(written)
    }

    /// Similarity search with metadata filtering.
    pub async fn search(&self, options: &SearchOptions) -> IndexResult<Vec<QueryMatch>> {
        let request = QueryRequest {
            text: options.query.clone(),
            top_k: options.max_results,
            include_metadata: true,
            filter: options.to_filter()?,
        };
        self.index.query(request, &self.namespace).await
    }

    /// Fetch recipes by id, skipping ids that are unknown or carry unreadable metadata.
    pub async fn get_by_ids(&self, ids: &[String]) -> IndexResult<Vec<Recipe>> {
        let items = self.index.fetch(ids, &self.namespace).await?;
        Ok(items
            .iter()
            .filter_map(|item| {
                let recipe = item
                    .metadata
                    .as_ref()
                    .and_then(|metadata| Recipe::from_metadata(&item.id, metadata));
                if recipe.is_none() {
                    log::warn!("Skipping recipe {} with unreadable metadata", item.id);
                }
                recipe
            })
            .collect())
    }
}
