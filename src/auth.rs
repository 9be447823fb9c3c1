//! Static shared-secret bearer authentication

use axum::http::{header, HeaderMap};

use crate::config::Config;
use crate::error::ApiError;

/// Reject the request unless it carries `Authorization: Bearer <ACCESS_TOKEN>`
///
/// A deployment without a configured token fails with a server error rather
/// than 401, so a missing secret is never mistaken for a client problem.
pub fn check(headers: &HeaderMap, config: &Config) -> Result<(), ApiError> {
    let Some(expected) = config.access_token.as_deref() else {
        return Err(ApiError::ServerMisconfigured);
    };

    let token = extract_bearer(headers);
    if token.is_empty() || token != expected {
        tracing::warn!("Rejected request with missing or invalid bearer token");
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

/// Token following `Bearer `, or `""` when the header is absent or malformed
fn extract_bearer(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("")
}
