//! Tool registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schema::{to_wire_schema, Schema};
use crate::types::{ToolCallResult, ToolDefinition};

/// What a tool produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Passed to the client verbatim.
    Text(String),
    /// Pretty-printed before it is sent.
    Json(Value),
}

impl From<ToolOutput> for ToolCallResult {
    fn from(output: ToolOutput) -> Self {
        match output {
            ToolOutput::Text(text) => ToolCallResult::text(text),
            ToolOutput::Json(value) => ToolCallResult::json(&value),
        }
    }
}

/// The body of a tool.
///
/// Receives arguments that already passed the tool's schema, with defaults
/// filled in. May await the recipe index; no timeout is applied around it.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutput>;
}

/// A named, schema-validated operation.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    input_schema: Schema,
    executor: Arc<dyn ToolExecutor>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Schema,
        executor: impl ToolExecutor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            executor: Arc::new(executor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Shared handle to the executor, so a call can outlive the registry borrow.
    pub fn executor(&self) -> Arc<dyn ToolExecutor> {
        self.executor.clone()
    }

    /// Public descriptor for `tools/list`.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: to_wire_schema(&self.input_schema),
        }
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}

/// Registry of all callable tools. Populated at startup, read-only afterwards.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names are unique for the lifetime of the registry.
    pub fn register(&mut self, tool: Tool) -> Result<(), RegistryError> {
        if self.by_name.contains_key(tool.name()) {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.by_name.insert(tool.name().to_string(), self.tools.len());
        tracing::debug!("Registered tool {}", tool.name());
        self.tools.push(tool);
        Ok(())
    }

    /// Descriptors of every tool, in registration order.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn resolve(&self, name: &str) -> Option<&Tool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
