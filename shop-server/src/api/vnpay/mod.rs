//! Gateway API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/vnpay/create | POST | 生成签名跳转地址 |
//! | /vnpay-return | GET | 网关回调（重定向回前端） |
//!
//! 回调地址挂在根路径：它是注册在网关侧的外部接口。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Gateway router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/vnpay/create", post(handler::create_payment_url))
        .route("/vnpay-return", get(handler::gateway_return))
}
