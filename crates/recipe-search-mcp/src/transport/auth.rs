//! Bearer-token authentication for the protected routes.
//!
//! Token comparison is constant-time.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use super::error::GatewayError;
use super::sse::AppState;

/// Reject requests whose `Authorization` header is not `Bearer <api key>`.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    if !is_authorized(request.headers(), &state.api_key) {
        tracing::debug!("Rejected unauthenticated request to {}", request.uri().path());
        return Err(GatewayError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn is_authorized(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| constant_time_eq(token, expected))
}

// Slices of different lengths compare unequal.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_match() {
        assert!(is_authorized(&headers("Bearer s3cret"), "s3cret"));
        assert!(!is_authorized(&headers("Bearer s3cre"), "s3cret"));
        assert!(!is_authorized(&headers("Basic s3cret"), "s3cret"));
        assert!(!is_authorized(&headers("s3cret"), "s3cret"));
        assert!(!is_authorized(&HeaderMap::new(), "s3cret"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(!constant_time_eq("abcd", "abc"));
        assert!(!constant_time_eq("", "abc"));
        assert!(constant_time_eq("", ""));
    }
}
