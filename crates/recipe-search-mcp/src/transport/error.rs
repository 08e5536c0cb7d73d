//! Transport-level failures and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors answered by the gateway itself, before or instead of dispatch.
///
/// Everything else, including unknown tools and bad arguments, travels
/// inside a normal JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid or missing sessionId")]
    SessionNotFound,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::SessionNotFound | GatewayError::InvalidMessage(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GatewayError::SessionNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::InvalidMessage("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
