pub mod admin;
pub mod public;
pub mod user;

use axum::{extract::Extension, middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::{AuthState, TokenKeys},
    logging::logging_middleware,
};
use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    let auth = AuthState {
        db: db.clone(),
        keys: keys.clone(),
    };

    Router::new()
        .merge(public_api_router())
        .merge(user_api_router(auth.clone()))
        .merge(admin_api_router(auth))
        .layer(Extension(db))
        .layer(Extension(keys))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
