//! Bootcamp HTTP handlers

use super::geo::distance_miles;
use super::model::{Bootcamp, CreateBootcamp, Location, UpdateBootcamp};
use crate::auth::guard::CurrentUser;
use crate::core::error::UpstreamError;
use crate::core::extractors::{ApiPath, ListParams, Validated};
use crate::core::{
    AdvancedResults, ApiError, ApiResult, FilterClause, Insert, Role, ValidationError,
    advanced_results,
};
use crate::entities::populate::CoursesOf;
use crate::outbound::{GeoLocation, GeocodeError};
use crate::server::state::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};
use std::path::Path;
use uuid::Uuid;

const PUBLISHERS: [Role; 2] = [Role::Publisher, Role::Admin];

fn geocode_error(address: &str, e: GeocodeError) -> ApiError {
    match e {
        GeocodeError::NoMatch(_) => ApiError::bad_request(format!("Could not locate address '{}'", address)),
        other => UpstreamError::new("geocoder", "Could not geocode address", other).into(),
    }
}

async fn geocode(state: &AppState, address: &str) -> ApiResult<GeoLocation> {
    state
        .geocoder
        .geocode(address)
        .await
        .map_err(|e| geocode_error(address, e))
}

async fn load_bootcamp(state: &AppState, id: Uuid) -> ApiResult<Bootcamp> {
    state
        .bootcamps
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))
}

pub async fn list_bootcamps(
    State(state): State<AppState>,
    ListParams(params): ListParams,
) -> ApiResult<Json<AdvancedResults>> {
    let courses = CoursesOf::new(state.courses.clone());
    let results = advanced_results(
        state.bootcamps.as_ref(),
        &params,
        &Bootcamp::query_schema(),
        &state.list_settings(),
        &[&courses],
    )
    .await?;
    Ok(Json(results))
}

pub async fn get_bootcamp(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let bootcamp = load_bootcamp(&state, id).await?;
    Ok(Json(json!({ "success": true, "data": bootcamp })))
}

/// Non-admins may publish a single bootcamp; the check and the insert are
/// one store operation.
pub async fn create_bootcamp(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Validated(payload): Validated<CreateBootcamp>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    principal.authorize(&PUBLISHERS)?;

    let location = geocode(&state, &payload.address).await?;
    let bootcamp = payload.into_bootcamp(principal.user_id, Location::from(location));

    let conflict = if principal.is_admin() {
        Vec::new()
    } else {
        vec![FilterClause::eq("user", principal.user_id)]
    };

    let bootcamp = match state.bootcamps.create_unless(bootcamp, conflict).await? {
        Insert::Created(bootcamp) => bootcamp,
        Insert::Conflict(_) => {
            return Err(ValidationError::AlreadyPublished {
                user_id: principal.user_id.to_string(),
            }
            .into());
        }
    };

    tracing::info!(bootcamp_id = %bootcamp.id, owner = %bootcamp.user, "bootcamp created");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": bootcamp }))))
}

pub async fn update_bootcamp(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    Validated(mut payload): Validated<UpdateBootcamp>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&PUBLISHERS)?;
    let mut bootcamp = load_bootcamp(&state, id).await?;
    principal.ensure_owner(bootcamp.user, "update", "this bootcamp")?;

    if let Some(address) = payload.address.take() {
        bootcamp.location = Some(geocode(&state, &address).await?.into());
    }
    payload.apply(&mut bootcamp);

    let bootcamp = state.bootcamps.update(&id, bootcamp).await?;
    Ok(Json(json!({ "success": true, "data": bootcamp })))
}

/// Deletes the bootcamp, then its courses and reviews
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&PUBLISHERS)?;
    let bootcamp = load_bootcamp(&state, id).await?;
    principal.ensure_owner(bootcamp.user, "delete", "this bootcamp")?;

    state
        .bootcamps
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))?;

    let related = [FilterClause::eq("bootcamp", id)];
    let courses = state.courses.delete_where(&related).await?;
    let reviews = state.reviews.delete_where(&related).await?;

    tracing::info!(bootcamp_id = %id, courses, reviews, "bootcamp deleted");
    Ok(Json(json!({ "success": true, "data": {} })))
}

pub async fn bootcamps_in_radius(
    State(state): State<AppState>,
    ApiPath((zipcode, distance)): ApiPath<(String, f64)>,
) -> ApiResult<Json<Value>> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "distance".to_string(),
            message: "must be a non-negative number of miles".to_string(),
        }
        .into());
    }

    let center = geocode(&state, &zipcode).await?;
    let origin = (center.latitude, center.longitude);

    let bootcamps: Vec<Bootcamp> = state
        .bootcamps
        .list()
        .await?
        .into_iter()
        .filter(|b| {
            b.location
                .as_ref()
                .is_some_and(|l| distance_miles(origin, (l.latitude(), l.longitude())) <= distance)
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": bootcamps.len(),
        "data": bootcamps
    })))
}

/// `.ext` of the uploaded file name, empty when there is none
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

pub async fn upload_photo(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    principal.authorize(&PUBLISHERS)?;
    let mut bootcamp = load_bootcamp(&state, id).await?;
    principal.ensure_owner(bootcamp.user, "update", "this bootcamp")?;

    let max_bytes = state.config.uploads.max_file_bytes;
    let too_large = || ApiError::bad_request(format!("Please upload an image less than {}", max_bytes));
    let no_file = || ApiError::bad_request("Please upload a file");

    let mut multipart = multipart.map_err(|_| no_file())?;
    let field = loop {
        match multipart.next_field().await.map_err(|_| no_file())? {
            Some(field) if field.name() == Some("file") => break field,
            Some(_) => continue,
            None => return Err(no_file()),
        }
    };

    let is_image = field
        .content_type()
        .is_some_and(|mime| mime.starts_with("image/"));
    if !is_image {
        return Err(ApiError::bad_request("Please upload an image"));
    }

    let name = format!("photo_{}{}", id, extension_of(field.file_name()));
    let bytes = field.bytes().await.map_err(|_| too_large())?;
    if bytes.len() > max_bytes {
        return Err(too_large());
    }

    state.blobs.write(&name, &bytes).await.map_err(|e| {
        ApiError::from(UpstreamError::new("blob", "Problem with file upload", e))
    })?;

    bootcamp.photo = name.clone();
    state.bootcamps.update(&id, bootcamp).await?;

    tracing::info!(bootcamp_id = %id, photo = %name, size = bytes.len(), "photo uploaded");
    Ok(Json(json!({ "success": true, "data": name })))
}
