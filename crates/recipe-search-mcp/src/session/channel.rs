//! The per-session message pipe and its worker task.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::protocol::{NegotiatedCapabilities, ProtocolHandler};
use crate::types::{JsonRpcMessage, McpError, McpResult};

/// Messages a session may have queued before posts start waiting.
pub const INBOX_CAPACITY: usize = 32;

/// A posted message together with the slot its response goes back through.
pub struct Inbound {
    pub message: JsonRpcMessage,
    pub reply: oneshot::Sender<Option<Value>>,
}

/// Handle to a session's worker.
///
/// Messages are handled one at a time in arrival order, so responses leave
/// the stream in the order requests were posted.
#[derive(Clone)]
pub struct SessionChannel {
    inbox: mpsc::Sender<Inbound>,
    cancel: CancellationToken,
}

impl SessionChannel {
    /// Spawn a worker that feeds `handler` and writes responses to `outbound`.
    ///
    /// Responses that do not fit in `outbound` are dropped from the stream;
    /// the posting caller still receives them. The worker stops when `cancel` fires or every handle is dropped.
    pub fn open(
        handler: Arc<ProtocolHandler>,
        outbound: mpsc::Sender<Value>,
        cancel: CancellationToken,
    ) -> Self {
        let (inbox, rx) = mpsc::channel(INBOX_CAPACITY);
        tokio::spawn(run_worker(handler, rx, outbound, cancel.clone()));
        Self { inbox, cancel }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.inbox.is_closed()
    }

    /// Stop the worker. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Token that fires when the channel closes.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Queue a message and wait for the worker to handle it.
    ///
    /// Fails with [`McpError::SessionNotFound`] once the channel is closed,
    /// including when it closes while the message is in flight.
    pub async fn deliver(&self, message: JsonRpcMessage) -> McpResult<Option<Value>> {
        if self.is_closed() {
            return Err(closed());
        }
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Inbound { message, reply })
            .await
            .map_err(|_| closed())?;
        response.await.map_err(|_| closed())
    }
}

fn closed() -> McpError {
    McpError::SessionNotFound("session is closed".to_string())
}

async fn run_worker(
    handler: Arc<ProtocolHandler>,
    mut inbox: mpsc::Receiver<Inbound>,
    outbound: mpsc::Sender<Value>,
    cancel: CancellationToken,
) {
    let mut negotiated = NegotiatedCapabilities::default();

    loop {
        let inbound = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = inbox.recv() => match next {
                Some(inbound) => inbound,
                None => break,
            },
        };

        let response = handler
            .handle_message(&mut negotiated, inbound.message)
            .await;

        // Closed mid-call: the stream is gone, drop the result.
        if cancel.is_cancelled() {
            tracing::debug!("Discarding response for closed session");
            break;
        }

        // The post reply never waits on the stream reader.
        if let Some(response) = &response {
            match outbound.try_send(response.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Session stream full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Session stream dropped before response was written");
                }
            }
        }
        let _ = inbound.reply.send(response);
    }

    tracing::debug!("Session worker stopped");
}
