//! Request authentication
//!
//! Adding [`CurrentUser`] to a handler's arguments makes the route
//! protected: the request is rejected with 401 unless it carries a valid
//! token whose subject still exists.

use crate::core::auth::{LOGGED_OUT_TOKEN, extract_token};
use crate::core::{ApiError, Principal};
use crate::server::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, state.config.auth.cookie_fallback)
            .filter(|token| token != LOGGED_OUT_TOKEN)
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))?;

        let user_id = state.tokens.verify(&token).map_err(|e| {
            tracing::warn!(error = %e, path = %parts.uri.path(), "rejected credential");
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;

        let user = state.users.get(&user_id).await?.ok_or_else(|| {
            tracing::warn!(%user_id, "token subject no longer exists");
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;

        Ok(CurrentUser(user.principal()))
    }
}
