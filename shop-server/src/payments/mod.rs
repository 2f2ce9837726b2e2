//! Payment reconciliation module
//!
//! - **service**: create/update/complete/refund payments, mirror order state
//! - **provider**: external refund integration (trait + HTTP impl + stub)
//!
//! 支付记录与订单 1:1，全部状态同步在单个写事务内完成。

pub mod error;
pub mod provider;
pub mod service;

pub use error::{PaymentError, PaymentResult};
pub use provider::{HttpRefundProvider, RefundError, RefundProvider, StubRefundProvider};
pub use service::{CreatePayment, PaymentService, UpdatePayment};
