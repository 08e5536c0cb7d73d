//! MCP protocol layer — message dispatch and capability negotiation.

pub mod handler;
pub mod negotiation;

pub use handler::ProtocolHandler;
pub use negotiation::NegotiatedCapabilities;
