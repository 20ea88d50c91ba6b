//! Auth HTTP handlers: registration, login, session and password flows

use crate::auth::guard::CurrentUser;
use crate::auth::password::{generate_reset_token, hash_reset_token};
use crate::core::auth::LOGGED_OUT_TOKEN;
use crate::core::error::UpstreamError;
use crate::core::extractors::{ApiPath, Validated};
use crate::core::{ApiError, ApiResult, FilterClause};
use crate::entities::user::model::{
    CreateUser, ForgotPassword, Login, ResetPassword, UpdateDetails, UpdatePassword, User,
    normalize_email,
};
use crate::outbound::MailMessage;
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::header::{HOST, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

const RESET_TOKEN_TTL_MINUTES: i64 = 10;
const LOGOUT_COOKIE_TTL_SECONDS: i64 = 10;

/// Routes mounted under `/auth`
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/me", get(me))
        .route("/auth/forgotpassword", post(forgot_password))
        .route("/auth/resetpassword/{token}", put(reset_password))
        .route("/auth/updatedetails", put(update_details))
        .route("/auth/updatepassword", put(update_password))
        .with_state(state)
}

fn cookie_header(state: &AppState, value: &str, expires: DateTime<Utc>) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "token={}; Path=/; Expires={}; HttpOnly",
        value,
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    if state.config.server.production {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::internal(format!("cookie header: {}", e)))
}

/// `{success, token}` plus the session cookie
fn token_response(state: &AppState, user: &User, status: StatusCode) -> ApiResult<Response> {
    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| ApiError::internal(format!("issue token for {}: {}", user.id, e)))?;

    let expires = Utc::now() + Duration::days(state.config.auth.cookie_expire_days);
    let cookie = cookie_header(state, &token, expires)?;

    let mut response = (status, Json(json!({ "success": true, "token": token }))).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

async fn load_user(state: &AppState, current: &CurrentUser) -> ApiResult<User> {
    state
        .users
        .get(&current.0.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", current.0.user_id))
}

async fn save_user(state: &AppState, user: User) -> ApiResult<User> {
    let id = user.id;
    state.users.update(&id, user).await
}

fn hashing_failed(e: impl std::fmt::Display) -> ApiError {
    ApiError::internal(format!("password hashing: {}", e))
}

pub async fn register(
    State(state): State<AppState>,
    Validated(payload): Validated<CreateUser>,
) -> ApiResult<Response> {
    let role = payload.role.unwrap_or_default();
    if !role.is_self_assignable() {
        return Err(ApiError::bad_request(format!(
            "Role \"{}\" can not be chosen at registration",
            role
        )));
    }

    let user = User::new(&payload.name, &payload.email, &payload.password, role)
        .map_err(hashing_failed)?;
    let user = state.users.create(user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    token_response(&state, &user, StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    Validated(payload): Validated<Login>,
) -> ApiResult<Response> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::bad_request("Please provide an email and password"));
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Please provide an email and password"));
    }

    let user = state
        .users
        .find_one(&[FilterClause::eq("email", normalize_email(&email))])
        .await?
        .filter(|user| user.password_matches(&password))
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    token_response(&state, &user, StatusCode::OK)
}

pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let expires = Utc::now() + Duration::seconds(LOGOUT_COOKIE_TTL_SECONDS);
    let cookie = cookie_header(&state, LOGGED_OUT_TOKEN, expires)?;

    let mut response = Json(json!({ "success": true, "data": {} })).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

pub async fn me(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Json<serde_json::Value>> {
    let user = load_user(&state, &current).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// Reset links point back at the host the request came in on
fn reset_url(headers: &HeaderMap, api_prefix: &str, token: &str) -> String {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}{}/auth/resetpassword/{}", scheme, host, api_prefix, token)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Validated(payload): Validated<ForgotPassword>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut user = state
        .users
        .find_one(&[FilterClause::eq("email", normalize_email(&payload.email))])
        .await?
        .ok_or_else(|| ApiError::no_match("There is no user with that email"))?;

    let token = generate_reset_token();
    user.reset_password_token = Some(hash_reset_token(&token));
    user.reset_password_expire = Some(Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
    let user = save_user(&state, user).await?;

    let url = reset_url(&headers, &state.config.server.api_prefix, &token);
    let message = MailMessage {
        to: user.email.clone(),
        subject: "Password reset token".to_string(),
        body: format!(
            "You are receiving this email because you (or someone else) has requested the reset of a password. Please make a PUT request to: \n\n {}",
            url
        ),
    };

    if let Err(e) = state.mailer.send(message).await {
        discard_reset_token(&state, &user).await?;
        return Err(UpstreamError::new("mailer", "Email could not be sent", e).into());
    }

    Ok(Json(json!({ "success": true, "data": "Email sent" })))
}

/// Clear the token `issued` was saved with, keeping anything else written
/// to the record since
async fn discard_reset_token(state: &AppState, issued: &User) -> ApiResult<()> {
    let Some(mut current) = state.users.get(&issued.id).await? else {
        return Ok(());
    };
    if current.reset_password_token != issued.reset_password_token {
        return Ok(());
    }
    current.clear_reset_token();
    save_user(state, current).await?;
    Ok(())
}

pub async fn reset_password(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    Validated(payload): Validated<ResetPassword>,
) -> ApiResult<Response> {
    let digest = hash_reset_token(&token);
    let now = Utc::now();

    let mut user = state
        .users
        .find_one(&[FilterClause::eq("resetPasswordToken", digest)])
        .await?
        .filter(|user| user.reset_password_expire.is_some_and(|expire| expire > now))
        .ok_or_else(|| ApiError::bad_request("Invalid token"))?;

    user.set_password(&payload.password).map_err(hashing_failed)?;
    user.clear_reset_token();
    let user = save_user(&state, user).await?;

    tracing::info!(user_id = %user.id, "password reset");
    token_response(&state, &user, StatusCode::OK)
}

pub async fn update_details(
    State(state): State<AppState>,
    current: CurrentUser,
    Validated(payload): Validated<UpdateDetails>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut user = load_user(&state, &current).await?;
    if let Some(name) = payload.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        user.email = normalize_email(&email);
    }
    let user = save_user(&state, user).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

pub async fn update_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Validated(payload): Validated<UpdatePassword>,
) -> ApiResult<Response> {
    let mut user = load_user(&state, &current).await?;
    if !user.password_matches(&payload.current_password) {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    user.set_password(&payload.new_password).map_err(hashing_failed)?;
    let user = save_user(&state, user).await?;
    token_response(&state, &user, StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_url_uses_host_and_forwarded_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            reset_url(&headers, "/api/v1", "abc"),
            "http://localhost/api/v1/auth/resetpassword/abc"
        );

        headers.insert(HOST, HeaderValue::from_static("devcamper.io"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(
            reset_url(&headers, "/api/v1", "abc"),
            "https://devcamper.io/api/v1/auth/resetpassword/abc"
        );
    }
}
