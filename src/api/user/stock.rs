use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::patch,
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::{
    auth::CurrentUser,
    extract::{coerce_int, OptionalJsonBody, PathId},
};
use crate::services::catalog;

pub fn stock_router() -> Router {
    Router::new().route("/products/:id/decrement_stock", patch(decrement_stock))
}

async fn decrement_stock(
    PathId(product_id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    OptionalJsonBody(payload): OptionalJsonBody<DecrementStock>,
) -> Result<Response, ApiError> {
    let requested = payload.and_then(|body| body.quantity);
    let quantity = coerce_int("quantity", requested.as_ref(), Some(1))?;
    if quantity <= 0 {
        return Err(ApiError::BadRequest("quantity must be a positive integer".into()));
    }

    let txn = db.begin().await?;
    let Some(product) = catalog::decrement_stock(&txn, product_id, quantity).await? else {
        return Err(ApiError::BadRequest(
            "Insufficient stock or product not found".into(),
        ));
    };
    txn.commit().await?;

    info!(
        user_id = user.id,
        product_id,
        quantity,
        stock = product.stock,
        "stock decremented"
    );
    Ok((StatusCode::OK, Json(product)).into_response())
}

#[derive(Deserialize, Debug)]
struct DecrementStock {
    quantity: Option<Value>,
}
