//! Order aggregate: order, owned items, and status history
//!
//! The order is persisted as one JSON document: items and the confirmation
//! history are embedded and live/die with the order row.

mod types;

pub use types::{OrderPaymentStatus, OrderStatus, PaymentMethod, ReturnStatus, StatusChange};

use serde::{Deserialize, Serialize};

/// Line item snapshot taken at checkout
///
/// `price` and `subtotal` are frozen at purchase time and never recomputed
/// from the live product. Only the return-workflow fields mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: u64,
    pub product_name: String,
    /// Always ≥ 1 (validated at creation)
    pub quantity: i64,
    /// Unit price at time of purchase
    pub price: f64,
    /// price × quantity, denormalized
    pub subtotal: f64,
    #[serde(default)]
    pub return_status: ReturnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<String>,
    /// Unix millis, set when the return is first requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_requested_at: Option<i64>,
    /// Unix millis, set when the return reaches Approved/Rejected/Completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_resolved_at: Option<i64>,
}

/// Order aggregate root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub items: Vec<OrderItem>,
    /// 2-decimal monetary total, computed from item subtotals
    pub total_price: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: OrderPaymentStatus,
    /// Append-only (status, timestamp) log; seeded with the Pending entry
    pub confirmation_history: Vec<StatusChange>,
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new pending order with its history seeded
    pub fn new(
        id: u64,
        user_id: u64,
        shipping_address: String,
        payment_method: PaymentMethod,
        note: Option<String>,
        items: Vec<OrderItem>,
        total_price: f64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            user_id,
            items,
            total_price,
            status: OrderStatus::Pending,
            payment_method,
            payment_status: OrderPaymentStatus::Unpaid,
            confirmation_history: vec![StatusChange {
                status: OrderStatus::Pending,
                date: now,
            }],
            shipping_address,
            note,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a history entry and move to the new status
    pub fn push_status(&mut self, status: OrderStatus) {
        let change = StatusChange::now(status);
        self.updated_at = change.date;
        self.status = status;
        self.confirmation_history.push(change);
    }

    /// Find an item by product id
    pub fn item_mut(&mut self, product_id: u64) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> OrderItem {
        OrderItem {
            product_id: 1,
            product_name: "Keyboard".to_string(),
            quantity: 2,
            price: 49.5,
            subtotal: 99.0,
            return_status: ReturnStatus::None,
            return_reason: None,
            return_requested_at: None,
            return_resolved_at: None,
        }
    }

    #[test]
    fn test_new_order_seeds_history() {
        let order = Order::new(
            1,
            7,
            "12 Elm Street".to_string(),
            PaymentMethod::Cod,
            None,
            vec![sample_item()],
            99.0,
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, OrderPaymentStatus::Unpaid);
        assert_eq!(order.confirmation_history.len(), 1);
        assert_eq!(order.confirmation_history[0].status, OrderStatus::Pending);
    }

    #[test]
    fn test_push_status_appends_history() {
        let mut order = Order::new(
            1,
            7,
            "12 Elm Street".to_string(),
            PaymentMethod::Cod,
            None,
            vec![sample_item()],
            99.0,
        );
        order.push_status(OrderStatus::Confirmed);
        order.push_status(OrderStatus::Shipped);
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.confirmation_history.len(), 3);
        assert_eq!(order.confirmation_history[2].status, OrderStatus::Shipped);
    }
}
