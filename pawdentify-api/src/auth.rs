//! Caller identity extraction
//!
//! Identity is a header-supplied opaque user identifier (`X-User-ID`),
//! trusted as-is. Handlers that take a [`UserId`] argument reject requests
//! without the header with 401 before touching the database.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the opaque caller identity
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Extractor for the authenticated user id
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match value {
            Some(user_id) => Ok(UserId(user_id.to_string())),
            None => Err(ApiError::Unauthenticated("User ID required".to_string())),
        }
    }
}
