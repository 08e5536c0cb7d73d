//! Tool: get_recipe_by_id — Load full recipes by id.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use recipe_index::RecipeStore;

use super::registry::{Tool, ToolExecutor, ToolOutput};
use crate::schema::{ObjectSchema, Schema};

/// Tool name as exposed in `tools/list`.
pub const NAME: &str = "get_recipe_by_id";

#[derive(Debug, Deserialize)]
struct GetParams {
    ids: Vec<String>,
}

/// Input schema for get_recipe_by_id.
pub fn schema() -> Schema {
    Schema::object(ObjectSchema::new().required(
        "ids",
        Schema::array(Schema::string())
            .min_items(1)
            .describe("Recipe ids, as returned by search_recipes"),
    ))
}

pub struct GetRecipeById {
    store: RecipeStore,
}

#[async_trait]
impl ToolExecutor for GetRecipeById {
    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutput> {
        let params: GetParams = serde_json::from_value(args)?;
        let recipes = self.store.get_by_ids(&params.ids).await?;
        if recipes.is_empty() {
            return Ok(ToolOutput::Text(format!(
                "No recipes found for ids: {}",
                params.ids.join(", ")
            )));
        }
        Ok(ToolOutput::Json(serde_json::to_value(recipes)?))
    }
}

/// Build the get_recipe_by_id tool.
pub fn tool(store: RecipeStore) -> Tool {
    Tool::new(NAME, "Get a recipe by its ID", schema(), GetRecipeById { store })
}
