//! Course HTTP handlers

use super::model::{Course, CreateCourse, UpdateCourse};
use crate::auth::guard::CurrentUser;
use crate::core::extractors::{ApiPath, ListParams, Validated};
use crate::core::{
    AdvancedResults, ApiError, ApiResult, FilterClause, Populate, Role, StoreQuery,
    ValidationError, advanced_results,
};
use crate::entities::bootcamp::aggregates::refresh_average_cost;
use crate::entities::populate::BootcampSummary;
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};
use uuid::Uuid;

const PUBLISHERS: [Role; 2] = [Role::Publisher, Role::Admin];

async fn load_course(state: &AppState, id: Uuid) -> ApiResult<Course> {
    state
        .courses
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course", id))
}

pub async fn list_courses(
    State(state): State<AppState>,
    ListParams(params): ListParams,
) -> ApiResult<Json<AdvancedResults>> {
    let summary = BootcampSummary::new(state.bootcamps.clone());
    let results = advanced_results(
        state.courses.as_ref(),
        &params,
        &Course::query_schema(),
        &state.list_settings(),
        &[&summary],
    )
    .await?;
    Ok(Json(results))
}

/// Every course of one bootcamp, unpaginated
pub async fn bootcamp_courses(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let courses = state
        .courses
        .find(&StoreQuery::filtered(vec![FilterClause::eq("bootcamp", bootcamp_id)]))
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": courses.len(),
        "data": courses
    })))
}

pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let course = load_course(&state, id).await?;
    let mut data = [serde_json::to_value(&course)
        .map_err(|e| ApiError::internal(format!("serialize course: {}", e)))?];
    BootcampSummary::new(state.bootcamps.clone())
        .populate(&mut data)
        .await?;
    let [data] = data;
    Ok(Json(json!({ "success": true, "data": data })))
}

pub async fn add_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    Validated(payload): Validated<CreateCourse>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    principal.authorize(&PUBLISHERS)?;
    let bootcamp = state
        .bootcamps
        .get(&bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp", bootcamp_id))?;
    principal.ensure_owner(
        bootcamp.user,
        "add a course to bootcamp",
        &bootcamp.id.to_string(),
    )?;

    let course = payload
        .into_course(bootcamp_id, principal.user_id)
        .ok_or_else(|| ValidationError::RequiredField {
            field: "weeks, tuition and minimum skill".to_string(),
        })?;
    let course = state.courses.create(course).await?;
    refresh_average_cost(&state, bootcamp_id).await?;

    tracing::info!(course_id = %course.id, %bootcamp_id, "course added");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": course }))))
}

pub async fn update_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    Validated(payload): Validated<UpdateCourse>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&PUBLISHERS)?;
    let mut course = load_course(&state, id).await?;
    principal.ensure_owner(course.user, "update course", &id.to_string())?;

    payload.apply(&mut course);
    let course = state.courses.update(&id, course).await?;
    refresh_average_cost(&state, course.bootcamp).await?;

    Ok(Json(json!({ "success": true, "data": course })))
}

pub async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&PUBLISHERS)?;
    let course = load_course(&state, id).await?;
    principal.ensure_owner(course.user, "delete course", &id.to_string())?;

    state
        .courses
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course", id))?;
    refresh_average_cost(&state, course.bootcamp).await?;

    Ok(Json(json!({ "success": true, "data": {} })))
}
