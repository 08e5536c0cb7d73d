//! Tool: search_recipes — Similarity search with nutrition and ingredient filters.

use async_trait::async_trait;
use serde_json::{json, Value};

use recipe_index::{RecipeStore, SearchOptions};

use super::registry::{Tool, ToolExecutor, ToolOutput};
use crate::schema::{ObjectSchema, Schema};

/// Tool name as exposed in `tools/list`.
pub const NAME: &str = "search_recipes";

/// Upper bound on `maxResults`.
pub const MAX_RESULTS_LIMIT: f64 = 100.0;

fn limit(description: &str) -> Schema {
    Schema::number().minimum(0.0).describe(description)
}

/// Input schema for search_recipes.
pub fn schema() -> Schema {
    Schema::object(
        ObjectSchema::new()
            .required(
                "query",
                Schema::string().describe("A detailed description of what you want to cook"),
            )
            .optional(
                "ingredients",
                Schema::array(Schema::string()).describe("A list of ingredients to filter by"),
            )
            .optional("maxCalories", limit("Maximum calories per serving"))
            .optional("maxTotalFat", limit("Maximum total fat per serving"))
            .optional("maxCarbohydrates", limit("Maximum carbohydrates per serving"))
            .optional("maxProtein", limit("Maximum protein per serving"))
            .optional("maxMinutes", limit("Maximum preparation time in minutes"))
            .with_default(
                "maxResults",
                Schema::integer()
                    .minimum(1.0)
                    .maximum(MAX_RESULTS_LIMIT)
                    .describe("Maximum number of results"),
                json!(10),
            ),
    )
}

/// Executor bound to a recipe store.
pub struct SearchRecipes {
    store: RecipeStore,
}

#[async_trait]
impl ToolExecutor for SearchRecipes {
    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutput> {
        let options: SearchOptions = serde_json::from_value(args)?;
        let matches = self.store.search(&options).await?;
        tracing::debug!(
            "search_recipes query={:?} returned {} matches",
            options.query,
            matches.len()
        );
        Ok(ToolOutput::Json(serde_json::to_value(matches)?))
    }
}

/// Build the search_recipes tool.
pub fn tool(store: RecipeStore) -> Tool {
    Tool::new(
        NAME,
        "Search for recipes by name, ingredients, or description",
        schema(),
        SearchRecipes { store },
    )
}
