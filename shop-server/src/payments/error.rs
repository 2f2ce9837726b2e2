use crate::db::StoreError;
use thiserror::Error;

/// Payment reconciliation errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    #[error("Payment not found: {0}")]
    PaymentNotFound(u64),

    #[error("Order already paid: {0}")]
    OrderAlreadyPaid(u64),

    #[error("Order closed: {0}")]
    OrderClosed(u64),

    #[error("Refund rejected: {0}")]
    RefundRejected(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;
