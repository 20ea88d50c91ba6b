//! Axum extractors that reject with [`ApiError`]
//!
//! The stock extractors answer malformed input with plain-text bodies. These
//! wrappers convert every rejection into the JSON error envelope:
//! - [`Validated`]: JSON body deserialized and checked with `validator`
//! - [`ApiPath`]: typed path parameters
//! - [`ListParams`]: raw query-string pairs for the query translator

use crate::core::error::{ApiError, ValidationError};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that passed its `validator` rules
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_course(
///     Validated(payload): Validated<CreateCourse>,
/// ) -> ApiResult<impl IntoResponse> {
///     // payload is already validated
/// }
/// ```
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::InvalidJson {
                message: rejection.body_text(),
            })?;

        payload.validate()?;

        Ok(Validated(payload))
    }
}

/// Path parameters with JSON rejections
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::InvalidValue {
                field: "path".to_string(),
                message: rejection.body_text(),
            })?;
        Ok(ApiPath(value))
    }
}

/// Query-string pairs in request order, later duplicates win
#[derive(Debug, Default, Clone)]
pub struct ListParams(pub IndexMap<String, String>);

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::InvalidValue {
                field: "query".to_string(),
                message: rejection.body_text(),
            })?;
        Ok(ListParams(pairs.into_iter().collect()))
    }
}
