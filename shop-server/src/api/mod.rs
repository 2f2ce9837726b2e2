//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期接口
//! - [`payments`] - 支付对账接口
//! - [`vnpay`] - 支付网关跳转与回调
//! - [`products`] - 商品目录接口
//! - [`carts`] - 购物车接口

pub mod carts;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod vnpay;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Assemble all resource routers
pub fn app_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(vnpay::router())
        .merge(products::router())
        .merge(carts::router())
}
