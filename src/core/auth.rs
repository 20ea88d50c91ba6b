//! Roles, principals and credential extraction
//!
//! A request is authenticated by a bearer token (optionally a `token`
//! cookie). Once resolved, the caller is a [`Principal`] whose [`Role`]
//! decides which routes it may use.

use crate::core::error::{ApiError, ApiResult};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Token value the logout cookie carries
pub const LOGGED_OUT_TOKEN: &str = "none";

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }

    /// Roles a caller may pick for themselves at registration
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::User | Role::Publisher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require one of `roles`
    pub fn authorize(&self, roles: &[Role]) -> ApiResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "User role \"{}\" is not authorized to access this route",
                self.role
            )))
        }
    }

    /// Require that the caller owns a record, admins pass unconditionally
    pub fn ensure_owner(&self, owner: Uuid, action: &str, what: &str) -> ApiResult<()> {
        if self.is_admin() || self.user_id == owner {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "User {} is not authorized to {} {}",
                self.user_id, action, what
            )))
        }
    }
}

/// Pull the raw credential out of a request.
///
/// `Authorization: Bearer <token>` wins; the `token` cookie is consulted
/// only when `cookie_fallback` is set and no bearer header is present.
pub fn extract_token(headers: &HeaderMap, cookie_fallback: bool) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    if bearer.is_some() || !cookie_fallback {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}
