pub mod auth;
pub mod product;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use auth::auth_router;
use product::product_router;

pub fn public_api_router() -> Router {
    Router::new()
        .route("/", get(health))
        .merge(auth_router())
        .merge(product_router())
}

async fn health() -> Json<Value> {
    Json(json!({
        "msg": "Shop backend ready"
    }))
}
