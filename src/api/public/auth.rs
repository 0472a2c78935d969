use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::entities::user::{self, hash_password, Entity as UserEntity, Role};
use crate::error::ApiError;
use crate::middleware::{auth::TokenKeys, extract::JsonBody};

//ROUTERS
pub fn auth_router() -> Router {
    Router::new()
        .route("/users/register", post(register_user))
        .route("/users/login", post(login))
}

//ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    JsonBody(payload): JsonBody<RegisterPayload>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(username), Some(password)) = (
        non_empty(payload.email.as_deref()),
        non_empty(payload.username.as_deref()),
        non_empty(payload.password.as_deref()),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };
    payload
        .validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let password_hash = hash_password(password)?;

    let txn = db.begin().await?;
    let new_user = user::ActiveModel {
        email: Set(email.to_owned()),
        username: Set(username.to_owned()),
        password_hash: Set(password_hash),
        role: Set(Role::User),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = match new_user.insert(&txn).await {
        Ok(created) => created,
        Err(err) => {
            return match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(ApiError::Conflict(
                    "Email or username already registered".into(),
                )),
                _ => Err(err.into()),
            };
        }
    };
    txn.commit().await?;

    info!(user_id = created.id, "user registered");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<TokenKeys>>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (
        non_empty(payload.email.as_deref()),
        non_empty(payload.password.as_deref()),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };

    let txn = db.begin().await?;
    let found = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(&txn)
        .await?;
    txn.commit().await?;

    let invalid = || ApiError::Unauthorized("Invalid credentials".into());
    let model = found.ok_or_else(invalid)?;
    if !model.check_hash(password)? {
        return Err(invalid());
    }

    let token = keys.generate_token(&model)?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "token": token
        })),
    )
        .into_response())
}

//utilities
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct RegisterPayload {
    #[validate(email(message = "Invalid email address"))]
    email: Option<String>,
    #[validate(length(max = 100, message = "Username is too long"))]
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}
