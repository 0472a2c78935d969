pub mod order;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, role_middleware, AuthState};
use order::admin_order_router;
use product::admin_product_router;

pub fn admin_api_router(auth: AuthState) -> Router {
    // Layers run outermost-last: the token is checked before the role.
    Router::new()
        .merge(admin_product_router())
        .merge(admin_order_router())
        .route_layer(from_fn_with_state(Role::Admin, role_middleware))
        .route_layer(from_fn_with_state(auth, auth_middleware))
}
