//! HTTP gateway: an SSE stream per client plus a message endpoint.

pub mod auth;
pub mod error;
pub mod sse;

pub use error::GatewayError;
pub use sse::{router, AppState, SseTransport, MESSAGE_PATH, OUTBOUND_CAPACITY, SSE_PATH};
