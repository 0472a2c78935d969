use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::middleware::{
    auth::CurrentUser,
    extract::{coerce_int, JsonBody, PathId},
};
use crate::services::cart;

//ROUTERS
pub fn cart_router() -> Router {
    Router::new()
        .route("/carts", get(get_cart))
        .route("/carts/add", post(add_product))
        .route("/carts/update/:product_id", put(update_quantity))
        .route("/carts/remove/:product_id", delete(remove_product))
        .route("/carts/clear", delete(clear_cart))
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let view = cart::view_cart(&txn, user.id).await?;
    txn.commit().await?;

    Ok((StatusCode::OK, Json(view)).into_response())
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<AddProduct>,
) -> Result<Response, ApiError> {
    let product_id = coerce_int("product_id", payload.product_id.as_ref(), None)?;
    let quantity = coerce_int("quantity", payload.quantity.as_ref(), Some(1))?;

    let txn = db.begin().await?;
    let item = cart::add_item(&txn, user.id, product_id, quantity).await?;
    txn.commit().await?;

    debug!(user_id = user.id, item_id = item.id, "cart line added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product added to cart"
        })),
    )
        .into_response())
}

async fn update_quantity(
    PathId(product_id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<PatchCart>,
) -> Result<Response, ApiError> {
    let quantity = coerce_int("quantity", payload.quantity.as_ref(), Some(1))?;

    let txn = db.begin().await?;
    cart::update_quantity(&txn, user.id, product_id, quantity).await?;
    txn.commit().await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Quantity updated"
        })),
    )
        .into_response())
}

async fn remove_product(
    PathId(product_id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    cart::remove_item(&txn, user.id, product_id).await?;
    txn.commit().await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Product removed from cart"
        })),
    )
        .into_response())
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    cart::clear(&txn, user.id).await?;
    txn.commit().await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Cart cleared"
        })),
    )
        .into_response())
}

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    product_id: Option<Value>,
    quantity: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct PatchCart {
    quantity: Option<Value>,
}
