pub mod cart;
pub mod order;
pub mod stock;

use axum::{middleware::from_fn_with_state, Router};

use crate::middleware::auth::{auth_middleware, AuthState};
use cart::cart_router;
use order::order_router;
use stock::stock_router;

/// Routes open to any authenticated user, whatever their role.
pub fn user_api_router(auth: AuthState) -> Router {
    Router::new()
        .merge(cart_router())
        .merge(order_router())
        .merge(stock_router())
        .route_layer(from_fn_with_state(auth, auth_middleware))
}
