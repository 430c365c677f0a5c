//! Extract the acting admin user from the request (e.g. X-Admin-User header).

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header naming the acting user. Set by an upstream auth proxy or the client.
pub const ADMIN_USER_HEADER: &str = "X-Admin-User";

/// Acting user for privilege checks. `None` when the header is absent or blank.
#[derive(Clone, Debug, Default)]
pub struct AdminUser(pub Option<String>);

impl AdminUser {
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AdminUser>() {
            return Ok(user.clone());
        }
        let value = parts
            .headers
            .get(ADMIN_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(AdminUser(value))
    }
}
