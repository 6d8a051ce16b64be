//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::errors::ApiError;
use crate::server::AppState;

/// The authenticated caller, resolved from the `Authorization` header.
///
/// Handlers that take an `AuthUser` parameter reject unauthenticated
/// requests with a 401 before running.
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// The caller's user ID.
    pub id: String,
    /// The caller's username.
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer token".into()))?;

        let user = state
            .store
            .authenticate(token)?
            .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;

        Ok(Self {
            id: user.id,
            username: user.username,
        })
    }
}
