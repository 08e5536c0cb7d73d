//! Per-session record of the `initialize` handshake.

use crate::types::{ClientCapabilities, Implementation, InitializeParams, InitializeResult, MCP_VERSION};

/// What a session's client told us during initialization.
///
/// Tools are served whether or not the handshake happened; the record only
/// feeds logging.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    /// The client's declared capabilities.
    pub client: ClientCapabilities,
    /// Client name and version, once known.
    pub client_info: Option<Implementation>,
    /// Whether `notifications/initialized` has been received.
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Process an initialize request and return the result.
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = params.capabilities;
        self.client_info = Some(params.client_info);
        InitializeResult::default_result()
    }

    /// Mark the handshake as complete.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::debug!("MCP handshake complete");
    }
}
