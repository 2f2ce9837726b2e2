//! Cart API Module
//!
//! 每用户一份购物车；下单时匹配的行项目在订单事务内被消费。

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

/// Cart router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{user_id}", get(handler::list))
        .route("/{user_id}", delete(handler::clear))
        .route("/{user_id}/items", post(handler::add_item))
        .route("/{user_id}/items/{product_id}", delete(handler::remove_item))
}
