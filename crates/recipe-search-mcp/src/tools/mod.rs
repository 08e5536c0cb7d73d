//! MCP tool implementations and registration.

pub mod get_recipe_by_id;
pub mod registry;
pub mod search_recipes;

use recipe_index::RecipeStore;

pub use registry::{RegistryError, Tool, ToolExecutor, ToolOutput, ToolRegistry};

/// Build the registry with every recipe tool, in discovery order.
pub fn default_registry(store: RecipeStore) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(search_recipes::tool(store.clone()))?;
    registry.register(get_recipe_by_id::tool(store))?;
    Ok(registry)
}
