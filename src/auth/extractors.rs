use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{error, warn};

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState};

/// Caller identity resolved from a bearer identity token and the matching user document.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub handle: String,
    pub image_url: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| {
                warn!("no bearer token found");
                ApiError::Unauthorized
            })?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "identity token rejected");
            ApiError::Unauthorized
        })?;

        let user = match state.store.get_user_by_id(claims.sub).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(account_id = %claims.sub, "token subject has no user document");
                return Err(ApiError::Unauthorized);
            }
            Err(e) => {
                error!(error = %e, "resolving caller failed");
                return Err(ApiError::error(e));
            }
        };

        Ok(AuthUser {
            handle: user.handle,
            image_url: user.image_url,
        })
    }
}
