use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::entities::order::Status;
use crate::error::ApiError;
use crate::middleware::extract::{JsonBody, PathId};
use crate::services::orders;

pub fn admin_order_router() -> Router {
    Router::new()
        .route("/orders/all", get(get_all_orders))
        .route("/orders/:id/status", patch(update_status))
}

async fn update_status(
    PathId(order_id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    JsonBody(payload): JsonBody<StatusPayload>,
) -> Result<Response, ApiError> {
    let status = payload
        .status
        .as_deref()
        .and_then(|s| s.parse::<Status>().ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid status".into()))?;

    let txn = db.begin().await?;
    let updated = orders::update_status(&txn, order_id, status).await?;
    txn.commit().await?;

    let Some(order) = updated else {
        return Err(ApiError::NotFound("Order not found".into()));
    };

    info!(order_id = order.id, status = %order.status, "order status changed");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Order status updated",
            "order": {
                "id": order.id,
                "status": order.status,
                "updated_at": order.updated_at,
            }
        })),
    )
        .into_response())
}

async fn get_all_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let rows = orders::list_all_orders(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(rows)).into_response())
}

#[derive(Deserialize, Debug)]
struct StatusPayload {
    status: Option<String>,
}
