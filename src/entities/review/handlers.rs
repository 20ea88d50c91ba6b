//! Review HTTP handlers

use super::model::{CreateReview, Review, UpdateReview};
use crate::auth::guard::CurrentUser;
use crate::core::extractors::{ApiPath, ListParams, Validated};
use crate::core::{
    AdvancedResults, ApiError, ApiResult, FilterClause, Populate, Role, StoreQuery,
    ValidationError, advanced_results,
};
use crate::entities::bootcamp::aggregates::refresh_average_rating;
use crate::entities::populate::BootcampSummary;
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};
use uuid::Uuid;

const REVIEWERS: [Role; 2] = [Role::User, Role::Admin];

async fn load_review(state: &AppState, id: Uuid) -> ApiResult<Review> {
    state
        .reviews
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", id))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    ListParams(params): ListParams,
) -> ApiResult<Json<AdvancedResults>> {
    let summary = BootcampSummary::new(state.bootcamps.clone());
    let results = advanced_results(
        state.reviews.as_ref(),
        &params,
        &Review::query_schema(),
        &state.list_settings(),
        &[&summary],
    )
    .await?;
    Ok(Json(results))
}

pub async fn bootcamp_reviews(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let reviews = state
        .reviews
        .find(&StoreQuery::filtered(vec![FilterClause::eq("bootcamp", bootcamp_id)]))
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": reviews.len(),
        "data": reviews
    })))
}

pub async fn get_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let review = load_review(&state, id).await?;
    let mut data = [serde_json::to_value(&review)
        .map_err(|e| ApiError::internal(format!("serialize review: {}", e)))?];
    BootcampSummary::new(state.bootcamps.clone())
        .populate(&mut data)
        .await?;
    let [data] = data;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// The `(bootcamp, user)` unique key makes a second review a duplicate-key error
pub async fn add_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    Validated(payload): Validated<CreateReview>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    principal.authorize(&REVIEWERS)?;
    if state.bootcamps.get(&bootcamp_id).await?.is_none() {
        return Err(ApiError::not_found("Bootcamp", bootcamp_id));
    }

    let review = payload
        .into_review(bootcamp_id, principal.user_id)
        .ok_or_else(|| ValidationError::RequiredField {
            field: "rating".to_string(),
        })?;
    let review = state.reviews.create(review).await?;
    refresh_average_rating(&state, bootcamp_id).await?;

    tracing::info!(review_id = %review.id, %bootcamp_id, "review added");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": review }))))
}

pub async fn update_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    Validated(payload): Validated<UpdateReview>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&REVIEWERS)?;
    let mut review = load_review(&state, id).await?;
    principal.ensure_owner(review.user, "update review", &id.to_string())?;

    payload.apply(&mut review);
    let review = state.reviews.update(&id, review).await?;
    refresh_average_rating(&state, review.bootcamp).await?;

    Ok(Json(json!({ "success": true, "data": review })))
}

pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&REVIEWERS)?;
    let review = load_review(&state, id).await?;
    principal.ensure_owner(review.user, "delete review", &id.to_string())?;

    state
        .reviews
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", id))?;
    refresh_average_rating(&state, review.bootcamp).await?;

    Ok(Json(json!({ "success": true, "data": {} })))
}
