use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{TokenError, TokenKeys};
use crate::error::AppError;

/// Bearer-token gate: extracts and validates the JWT, yielding the caller's
/// user id. Handlers taking this run only for authenticated requests.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(TokenError::Missing)?;

        // Expect "Bearer <token>"
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .ok_or(TokenError::Malformed)?;

        let keys = TokenKeys::from_ref(state);
        match keys.verify(token) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(e) => {
                warn!(reason = %e, "rejected bearer token");
                Err(e.into())
            }
        }
    }
}
