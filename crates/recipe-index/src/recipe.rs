//! Recipe records and their index representation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::index::UpsertItem;

/// Nutrition facts per serving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: f64,
    pub total_fat: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub protein: f64,
    pub saturated_fat: f64,
    pub carbohydrates: f64,
}

/// A recipe as stored in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    pub nutrition: Nutrition,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub minutes: u32,
}

impl Recipe {
    /// Text the index embeds for similarity search.
    pub fn embedding_input(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Metadata stored alongside the vector. Filters address these fields.
    pub fn metadata(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "steps": self.steps,
            "minutes": self.minutes,
            "nutrition": self.nutrition,
            "ingredients": self.ingredients,
        })
    }

    /// Build the upsert item for this recipe.
    pub fn to_upsert_item(&self) -> UpsertItem {
        UpsertItem {
            id: self.id.clone(),
            data: self.embedding_input(),
            metadata: self.metadata(),
        }
    }

    /// Rebuild a recipe from an id and the metadata written by [`Recipe::metadata`].
    ///
    /// Returns `None` when the metadata is missing required fields.
    pub fn from_metadata(id: &str, metadata: &Value) -> Option<Self> {
        let mut object = metadata.as_object()?.clone();
        object.insert("id".to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(object)).ok()
    }
}
