//! Admin session authentication.
//!
//! Mutating endpoints require a CMS admin session token: an HS256 JWT in the
//! `Authorization: Bearer` header, signed with the shared session secret.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use kentcms_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Admin user identifier.
    pub sub: String,
    pub exp: usize,
}

/// Extractor for an authenticated admin session.
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: Claims,
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Missing Authorization header".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Authorization header must be a Bearer token".to_string())
        })?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.session_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid or expired session token".to_string())
        })?;

        Ok(Session {
            claims: data.claims,
        })
    }
}
