//! Payment API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payments | POST | 创建支付（自动结算方式立即完成） |
//! | /api/payments/{order_id} | PUT | 对账（创建或更新支付并回写订单） |
//! | /api/payments/{order_id} | GET | 查询订单的支付 |
//! | /api/payments/{payment_id}/complete | POST | 手动完成支付 |
//! | /api/payments/{payment_id}/refund | POST | 手动退款 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    // 同一路径位置统一用 {id}：PUT/GET 按订单 id，complete/refund 按支付 id
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}", get(handler::get_by_order))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/refund", post(handler::refund))
}
