//! CreateOrder action
//!
//! Creates the order aggregate, reserves stock, and consumes matching cart
//! lines — all or nothing.

use crate::db::{Store, ORDER_SEQ};
use crate::orders::actions::OrderAction;
use crate::orders::error::{OrderError, OrderResult};
use crate::orders::money;
use redb::WriteTransaction;
use shared::{Order, OrderItem, PaymentMethod, ReturnStatus};
use std::collections::HashSet;

/// Line item as submitted at checkout
///
/// `price` is the price the customer saw; the subtotal is recomputed
/// server-side and becomes the immutable snapshot.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub user_id: u64,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl OrderAction for CreateOrderAction {
    type Output = Order;

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<Order> {
        // 1. Validate inputs
        if self.shipping_address.trim().is_empty() {
            return Err(OrderError::Validation(
                "shipping_address is required".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &self.items {
            money::validate_line(item.price, item.quantity)?;
        }

        // 2. Reserve stock against the live product rows
        //
        // 库存在下单时一次性预留；发货/签收不再二次扣减。
        let mut snapshots = Vec::with_capacity(self.items.len());
        let now = crate::utils::time::now_millis();
        for item in &self.items {
            let mut product = store
                .product_in(txn, item.product_id)?
                .ok_or(OrderError::ProductNotFound(item.product_id))?;

            if product.stock < item.quantity {
                return Err(OrderError::InsufficientStock {
                    product: product.name,
                    requested: item.quantity,
                    available: product.stock,
                });
            }

            product.stock -= item.quantity;
            product.updated_at = now;
            store.put_product_in(txn, &product)?;

            snapshots.push(OrderItem {
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                price: item.price,
                subtotal: money::line_subtotal(item.price, item.quantity),
                return_status: ReturnStatus::None,
                return_reason: None,
                return_requested_at: None,
                return_resolved_at: None,
            });
        }

        // 3. Persist the aggregate
        let total_price = money::order_total(snapshots.iter().map(|i| i.subtotal));
        let order_id = store.next_id(txn, ORDER_SEQ)?;
        let order = Order::new(
            order_id,
            self.user_id,
            self.shipping_address.clone(),
            self.payment_method,
            self.note.clone(),
            snapshots,
            total_price,
        );
        store.put_order_in(txn, &order)?;

        // 4. Consume the purchased cart lines
        let purchased: HashSet<u64> = self.items.iter().map(|i| i.product_id).collect();
        let cart = store.cart_in(txn, self.user_id)?;
        if !cart.is_empty() {
            let remaining: Vec<_> = cart
                .into_iter()
                .filter(|line| !purchased.contains(&line.product_id))
                .collect();
            store.put_cart_in(txn, self.user_id, &remaining)?;
        }

        Ok(order)
    }
}
