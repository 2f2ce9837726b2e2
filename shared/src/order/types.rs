//! Status vocabularies for the order aggregate
//!
//! Every status dimension is a closed enum so that out-of-vocabulary values
//! are rejected at the deserialization boundary instead of deep inside a
//! handler.

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle status
///
/// `Pending → Confirmed → Processing → Shipped → Delivered`;
/// `Cancelled` is reachable from any non-terminal state (and from
/// `Delivered`, which triggers a fulfillment reversal).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    /// (except Delivered → Cancelled, handled by the lifecycle manager).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// ============================================================================
// Payment Method
// ============================================================================

/// How the customer pays for an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// 货到付款 - 需要人工确认收款
    Cod,
    Bank,
    Paypal,
    Momo,
    Vnpay,
}

impl PaymentMethod {
    /// Auto-settling methods are treated as confirmed the moment a payment
    /// record is created; only COD waits for manual reconciliation.
    pub fn is_auto_settling(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }

    /// Online methods go through an external provider for refunds.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Bank | PaymentMethod::Paypal | PaymentMethod::Momo | PaymentMethod::Vnpay
        )
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "COD"),
            PaymentMethod::Bank => write!(f, "BANK"),
            PaymentMethod::Paypal => write!(f, "PAYPAL"),
            PaymentMethod::Momo => write!(f, "MOMO"),
            PaymentMethod::Vnpay => write!(f, "VNPAY"),
        }
    }
}

// ============================================================================
// Payment Status (order-side vocabulary)
// ============================================================================

/// Order-side payment status, derived from the Payment record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl std::fmt::Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentStatus::Unpaid => write!(f, "UNPAID"),
            OrderPaymentStatus::Paid => write!(f, "PAID"),
            OrderPaymentStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

// ============================================================================
// Return Status
// ============================================================================

/// Per-item return workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    #[default]
    None,
    Requested,
    Approved,
    Rejected,
    Completed,
}

// ============================================================================
// Status History
// ============================================================================

/// Append-only confirmation history entry: (status, timestamp)
///
/// 纯审计日志，不做状态守卫。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub status: OrderStatus,
    /// Unix millis
    pub date: i64,
}

impl StatusChange {
    pub fn now(status: OrderStatus) -> Self {
        Self {
            status,
            date: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_auto_settling_classification() {
        assert!(PaymentMethod::Momo.is_auto_settling());
        assert!(PaymentMethod::Paypal.is_auto_settling());
        assert!(PaymentMethod::Vnpay.is_auto_settling());
        assert!(PaymentMethod::Bank.is_auto_settling());
        assert!(!PaymentMethod::Cod.is_auto_settling());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");

        // Out-of-vocabulary values are rejected at the type level
        let bad: Result<OrderStatus, _> = serde_json::from_str("\"SHIPPED_BACK\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_payment_status_rejects_unknown_value() {
        let bad: Result<OrderPaymentStatus, _> = serde_json::from_str("\"PARTIALLY_PAID\"");
        assert!(bad.is_err());
    }
}
