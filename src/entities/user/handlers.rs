//! User administration handlers; every route requires the admin role

use super::model::{CreateUser, UpdateUser, User};
use crate::auth::guard::CurrentUser;
use crate::core::extractors::{ApiPath, ListParams, Validated};
use crate::core::{AdvancedResults, ApiError, ApiResult, Role, advanced_results};
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};
use uuid::Uuid;

fn password_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::internal(format!("password hashing: {}", e))
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ListParams(params): ListParams,
) -> ApiResult<Json<AdvancedResults>> {
    principal.authorize(&[Role::Admin])?;
    let results = advanced_results(
        state.users.as_ref(),
        &params,
        &User::query_schema(),
        &state.list_settings(),
        &[],
    )
    .await?;
    Ok(Json(results))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&[Role::Admin])?;
    let user = state
        .users
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(Json(json!({ "success": true, "data": user })))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Validated(payload): Validated<CreateUser>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    principal.authorize(&[Role::Admin])?;
    let user = User::new(
        &payload.name,
        &payload.email,
        &payload.password,
        payload.role.unwrap_or_default(),
    )
    .map_err(password_error)?;
    let user = state.users.create(user).await?;

    tracing::info!(user_id = %user.id, admin = %principal.user_id, "user created by admin");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": user }))))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    Validated(payload): Validated<UpdateUser>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&[Role::Admin])?;
    let mut user = state
        .users
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    payload.apply(&mut user).map_err(password_error)?;
    let user = state.users.update(&id, user).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&[Role::Admin])?;
    state
        .users
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = %id, admin = %principal.user_id, "user deleted");
    Ok(Json(json!({ "success": true, "data": {} })))
}
