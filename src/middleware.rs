//! Bearer-token gate in front of the admin routes.

use crate::config::AdminSettings;
use crate::error::AdminError;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Reject the request with 401 unless it carries `Authorization: Bearer <token>` matching
/// `settings.token`. A no-op when no token is configured.
pub async fn require_token(
    State(settings): State<Arc<AdminSettings>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AdminError> {
    let Some(expected) = settings.token.as_deref() else {
        return Ok(next.run(req).await);
    };
    let given = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);
    if !token_matches(given, expected) {
        tracing::warn!(path = %req.uri().path(), "missing or wrong admin token");
        return Err(AdminError::Unauthorized);
    }
    Ok(next.run(req).await)
}

/// Constant-time for tokens of equal length.
fn token_matches(given: Option<&str>, expected: &str) -> bool {
    given.is_some_and(|g| bool::from(g.as_bytes().ct_eq(expected.as_bytes())))
}
