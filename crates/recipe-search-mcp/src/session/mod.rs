//! Client sessions: one SSE stream, one inbox, one worker.

pub mod channel;
pub mod manager;

pub use channel::{Inbound, SessionChannel, INBOX_CAPACITY};
pub use manager::{Session, SessionGuard, SessionId, SessionManager};
