//! Bearer-token authentication.
//!
//! Tokens are opaque strings issued elsewhere; this module only resolves
//! them to user ids.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

/// Resolves bearer tokens to user ids.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    tokens: Arc<HashMap<String, UserId>>,
}

impl Authenticator {
    /// Creates an authenticator from a token table.
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }

    /// Returns the user the token belongs to.
    pub fn authenticate(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }

    /// Returns the number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("MISSING_TOKEN", "Access token required"))?;

        let authenticator = Authenticator::from_ref(state);
        match authenticator.authenticate(token) {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                tracing::debug!("rejected unknown bearer token");
                Err(ApiError::unauthorized(
                    "INVALID_TOKEN",
                    "Invalid or expired token",
                ))
            }
        }
    }
}
