//! Error types and JSON-RPC error codes.

use thiserror::Error;

use super::message::{JsonRpcError, RequestId};
use crate::schema::ValidationErrors;

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Server-defined error codes (reserved range -32000 to -32099).
pub mod mcp_error_codes {
    /// Session id is unknown or its connection has closed.
    pub const SESSION_NOT_FOUND: i32 = -32004;
}

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Unknown method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Method parameters could not be decoded.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Session id is unknown or its connection has closed.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of a single `tools/call`, reported inside the tool result.
#[derive(Debug, Error)]
pub enum CallToolError {
    /// No tool with this name is registered.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments failed validation; the tool was not executed.
    #[error("Invalid arguments for tool {tool}: {errors}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Every violation found.
        errors: ValidationErrors,
    },

    /// The tool ran and failed.
    #[error("Error executing tool {tool}: {message}")]
    Execution {
        /// Tool name.
        tool: String,
        /// Failure description.
        message: String,
    },
}

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            McpError::Json(_) => error_codes::PARSE_ERROR,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::Transport(_) | McpError::Io(_) => error_codes::INTERNAL_ERROR,
            McpError::SessionNotFound(_) => mcp_error_codes::SESSION_NOT_FOUND,
        }
    }

    /// Convert into a JSON-RPC error response for the given request.
    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string())
    }
}

/// Convenience alias.
pub type McpResult<T> = Result<T, McpError>;
