use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr, SqlErr, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::extract::{JsonBody, PathId};
use crate::services::catalog::{self, NewProduct, ProductChanges};

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

//ROUTES
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    JsonBody(payload): JsonBody<CreateProduct>,
) -> Result<Response, ApiError> {
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let Some(price) = payload.price.filter(|_| !name.is_empty()) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };
    payload
        .validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    check_price(price)?;

    let new_product = NewProduct {
        name: name.to_owned(),
        description: payload.description.unwrap_or_default(),
        price,
        stock: payload.stock.unwrap_or(0),
        category: payload.category.unwrap_or_default(),
        image_url: payload.image_url.unwrap_or_default(),
    };

    let txn = db.begin().await?;
    let created = catalog::create_product(&txn, new_product).await?;
    txn.commit().await?;

    info!(product_id = created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn update_product(
    PathId(id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    JsonBody(payload): JsonBody<UpdateProduct>,
) -> Result<Response, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }

    let changes = ProductChanges {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        category: payload.category,
        image_url: payload.image_url,
    };
    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".into()));
    }

    let txn = db.begin().await?;
    let updated = catalog::update_product(&txn, id, changes).await?;
    txn.commit().await?;

    match updated {
        Some(product) => Ok((StatusCode::OK, Json(product)).into_response()),
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

async fn delete_product(
    PathId(id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    if catalog::order_references(&txn, id).await? > 0 {
        return Err(referenced());
    }
    let deleted = catalog::delete_product(&txn, id)
        .await
        .map_err(referenced_product)?;
    txn.commit().await?;

    if !deleted {
        return Err(ApiError::NotFound("Product not found".into()));
    }

    info!(product_id = id, "product deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Product {id} deleted")
        })),
    )
        .into_response())
}

//utilities
fn check_price(price: Decimal) -> Result<(), ApiError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ApiError::BadRequest("price must not be negative".into()));
    }
    Ok(())
}

fn referenced_product(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => referenced(),
        _ => err.into(),
    }
}

fn referenced() -> ApiError {
    ApiError::BadRequest("Product is referenced by existing orders".into())
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateProduct {
    #[validate(length(max = 255, message = "name is too long"))]
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    stock: Option<i32>,
    #[validate(length(max = 100, message = "category is too long"))]
    category: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
struct UpdateProduct {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    stock: Option<i32>,
    #[validate(length(max = 100, message = "category is too long"))]
    category: Option<String>,
    image_url: Option<String>,
}
