use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::extract::PathId;
use crate::services::catalog::{self, ProductFilter};

pub fn product_router() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
}

async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let filter = ProductFilter {
        category: params.category,
        search: params.search,
    };

    let txn = db.begin().await?;
    let products = catalog::list_products(&txn, &filter).await?;
    txn.commit().await?;

    if products.is_empty() {
        return Err(ApiError::NotFound("No products found".into()));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "products": products
        })),
    )
        .into_response())
}

async fn get_product(
    PathId(id): PathId,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let txn = db.begin().await?;
    let found = catalog::find_product(&txn, id).await?;
    txn.commit().await?;

    match found {
        Some(product) => Ok((StatusCode::OK, Json(product)).into_response()),
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<String>,
    search: Option<String>,
}
