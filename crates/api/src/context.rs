use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

use bridgecms_auth::{AuthError, JwtClaims, Role};
use bridgecms_core::UserId;

use crate::app::errors::ApiError;
use crate::middleware::{AuthState, extract_bearer};

/// Principal context for a request (authenticated identity + role).
///
/// Handlers that take this extractor require a valid bearer token; the
/// request is rejected with 401 before the handler body runs otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    claims: JwtClaims,
}

impl PrincipalContext {
    pub fn new(claims: JwtClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &JwtClaims {
        &self.claims
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PrincipalContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<AuthState>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("auth state not installed".to_string()))?;

        let token = extract_bearer(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AuthError::InvalidToken(e)
        })?;

        Ok(Self::new(claims))
    }
}
