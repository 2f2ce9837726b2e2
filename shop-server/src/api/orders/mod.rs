//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 下单 |
//! | /api/orders | GET | 订单列表 |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id} | DELETE | 删除订单（级联删除订单项与支付） |
//! | /api/orders/{id}/status | PUT | 状态流转 |
//! | /api/orders/{id}/payment-status | PUT | 覆写支付状态 |
//! | /api/orders/{id}/items/{product_id}/return | PUT | 退货流程 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}", delete(handler::remove))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/payment-status", put(handler::update_payment_status))
        .route(
            "/{id}/items/{product_id}/return",
            put(handler::update_return),
        )
}
