use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;

/// `Json` whose rejections use the API's `{"error": ...}` shape with a 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Like [`JsonBody`], but an empty body without a content type yields `None`.
pub struct OptionalJsonBody<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(CONTENT_TYPE) {
            let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
            return Ok(Self(Some(value)));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        if body.is_empty() {
            Ok(Self(None))
        } else {
            Err(ApiError::BadRequest(
                "Expected request with `Content-Type: application/json`".into(),
            ))
        }
    }
}

/// Single integer path segment, e.g. the `:id` of `/products/:id`.
pub struct PathId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Integer coercion for loosely typed body fields: JSON integers and numeric
/// strings are accepted, a missing field falls back to `default`.
pub fn coerce_int(name: &str, value: Option<&Value>, default: Option<i32>) -> Result<i32, ApiError> {
    let invalid = || ApiError::BadRequest(format!("{name} must be an integer"));

    match value {
        None | Some(Value::Null) => default
            .ok_or_else(|| ApiError::BadRequest(format!("Missing required field: {name}"))),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(invalid),
        Some(Value::String(text)) => text.trim().parse::<i32>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
