//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 错误码 | 分类 | HTTP |
//! |--------|------|------|
//! | E0000 | 成功 | 200 |
//! | E0002 | 验证失败 | 400 |
//! | E0003 | 资源不存在 | 404 |
//! | E0004 | 资源冲突 | 409 |
//! | E0007 | 签名无效 | 400 |
//! | E9001 | 内部错误 | 500 |
//! | E9002 | 数据库错误 | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::StoreError;
use crate::gateway::GatewayError;
use crate::orders::OrderError;
use crate::payments::PaymentError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// 资源/状态冲突 (409)
    Conflict(String),

    #[error("Invalid signature")]
    /// 网关回调签名无效 (400)
    SignatureInvalid,

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::SignatureInvalid => (
                StatusCode::BAD_REQUEST,
                "E0007",
                "Invalid signature".to_string(),
            ),
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Conversions from domain error types ==========

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::OrderNotFound(id) => AppError::not_found(format!("Order {} not found", id)),
            OrderError::ProductNotFound(id) => {
                AppError::not_found(format!("Product {} not found", id))
            }
            OrderError::InsufficientStock { product, .. } => {
                AppError::conflict(format!("Insufficient stock for product {}", product))
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::conflict(format!("Cannot transition order from {} to {}", from, to))
            }
            OrderError::ItemNotFound { order_id, product_id } => AppError::not_found(format!(
                "Order {} has no item for product {}",
                order_id, product_id
            )),
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::OrderNotFound(id) => {
                AppError::not_found(format!("Order {} not found", id))
            }
            PaymentError::PaymentNotFound(id) => {
                AppError::not_found(format!("Payment {} not found", id))
            }
            PaymentError::OrderAlreadyPaid(id) => AppError::conflict(format!(
                "Order {} is already paid, create a new order instead",
                id
            )),
            PaymentError::OrderClosed(id) => AppError::conflict(format!(
                "Order {} is closed, create a new order instead",
                id
            )),
            PaymentError::RefundRejected(reason) => {
                AppError::conflict(format!("Refund rejected by provider: {}", reason))
            }
            PaymentError::InvalidAmount(msg) => AppError::Validation(msg),
            PaymentError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidSignature => AppError::SignatureInvalid,
            GatewayError::MissingParameter(name) => {
                AppError::validation(format!("Missing gateway parameter: {}", name))
            }
            GatewayError::Key(msg) => AppError::Internal(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}
