use crate::db::StoreError;
use shared::OrderStatus;
use thiserror::Error;

/// Order lifecycle errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {order_id} has no item for product {product_id}")]
    ItemNotFound { order_id: u64, product_id: u64 },

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type OrderResult<T> = Result<T, OrderError>;
