use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::{auth::CurrentUser, extract::PathId};
use crate::services::{checkout, orders};

pub fn order_router() -> Router {
    Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/:id", get(get_order))
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let order = checkout::checkout(&db, user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order created successfully",
            "order_id": order.id,
            "status": order.status,
            "total_amount": order.total_amount,
            "created_at": order.created_at,
        })),
    )
        .into_response())
}

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let found = orders::list_user_orders(&txn, user.id).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(found)).into_response())
}

async fn get_order(
    PathId(order_id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let details = orders::order_details(&txn, user.id, order_id).await?;
    txn.commit().await?;

    match details {
        Some(details) => Ok((StatusCode::OK, Json(details)).into_response()),
        None => Err(ApiError::NotFound("Order not found".into())),
    }
}
