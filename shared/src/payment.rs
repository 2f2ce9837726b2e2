//! Payment record - 1:1 with an order
//!
//! The payment carries its own status vocabulary; the order mirrors a
//! coarser derived view ([`OrderPaymentStatus`]). The mapping between the
//! two lives here so both sides stay consistent.

use crate::order::{OrderPaymentStatus, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Payment-side status vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Derive the order-side view of this status.
    ///
    /// Failed settles back to Unpaid: the order can still be paid again.
    pub fn as_order_status(&self) -> OrderPaymentStatus {
        match self {
            PaymentStatus::Pending | PaymentStatus::Failed => OrderPaymentStatus::Unpaid,
            PaymentStatus::Completed => OrderPaymentStatus::Paid,
            PaymentStatus::Refunded => OrderPaymentStatus::Refunded,
        }
    }
}

impl OrderPaymentStatus {
    /// Map the externally-facing vocabulary onto the payment-side one.
    pub fn as_payment_status(&self) -> PaymentStatus {
        match self {
            OrderPaymentStatus::Unpaid => PaymentStatus::Pending,
            OrderPaymentStatus::Paid => PaymentStatus::Completed,
            OrderPaymentStatus::Refunded => PaymentStatus::Refunded,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Completed => write!(f, "COMPLETED"),
            PaymentStatus::Failed => write!(f, "FAILED"),
            PaymentStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// Payment entity (at most one per order)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: u64,
    pub order_id: u64,
    pub amount: f64,
    /// Mirrors the order's payment method
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// External reference, unique per payment
    pub transaction_id: String,
    /// Unix millis, stamped when the payment completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_round_trip() {
        assert_eq!(
            OrderPaymentStatus::Paid.as_payment_status(),
            PaymentStatus::Completed
        );
        assert_eq!(
            OrderPaymentStatus::Unpaid.as_payment_status(),
            PaymentStatus::Pending
        );
        assert_eq!(
            OrderPaymentStatus::Refunded.as_payment_status(),
            PaymentStatus::Refunded
        );
    }

    #[test]
    fn test_failed_maps_to_unpaid() {
        assert_eq!(
            PaymentStatus::Failed.as_order_status(),
            OrderPaymentStatus::Unpaid
        );
    }
}
