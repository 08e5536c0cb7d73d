//! Recipe Search MCP Server: recipe similarity search for tool-calling LLM clients.
//!
//! The server speaks MCP (JSON-RPC 2.0) over an SSE transport. Each client
//! opens a stream, receives a message endpoint bound to its session, and posts
//! requests that are validated and dispatched against the tool registry.

pub mod config;
pub mod protocol;
pub mod schema;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use protocol::ProtocolHandler;
pub use session::SessionManager;
pub use tools::{default_registry, ToolRegistry};
pub use transport::SseTransport;
