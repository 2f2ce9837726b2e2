//! UpdateStatus action - the order state machine
//!
//! Side effects are keyed off the (previous → new) status pair, not the new
//! status alone:
//!
//! | previous → new | stock | sold | other |
//! |----------------|-------|------|-------|
//! | * → Delivered | unchanged (reserved at creation) | +quantity | `delivered_at`, notify |
//! | Delivered → Cancelled | +quantity | −quantity (floored at 0) | |
//! | other → Cancelled | +quantity | unchanged | |
//!
//! Every accepted transition appends exactly one confirmation-history entry.
//! Exits from terminal states are rejected, except Delivered → Cancelled
//! which reverses the fulfillment.

use crate::db::Store;
use crate::orders::actions::OrderAction;
use crate::orders::error::{OrderError, OrderResult};
use redb::WriteTransaction;
use shared::{Order, OrderStatus};

/// UpdateStatus action
#[derive(Debug, Clone)]
pub struct UpdateStatusAction {
    pub order_id: u64,
    pub new_status: OrderStatus,
}

/// Outcome handed back to the manager
#[derive(Debug)]
pub struct StatusUpdate {
    pub order: Order,
    /// The order just transitioned into Delivered; notify after commit.
    pub delivered: bool,
}

impl OrderAction for UpdateStatusAction {
    type Output = StatusUpdate;

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<StatusUpdate> {
        let mut order = store
            .order_in(txn, self.order_id)?
            .ok_or(OrderError::OrderNotFound(self.order_id))?;

        let prev = order.status;

        // Terminal-state guard: only Delivered → Cancelled may leave a
        // terminal state (it reverses the fulfillment below).
        if prev == OrderStatus::Cancelled
            || (prev == OrderStatus::Delivered && self.new_status != OrderStatus::Cancelled)
        {
            return Err(OrderError::InvalidTransition {
                from: prev,
                to: self.new_status,
            });
        }

        let now = crate::utils::time::now_millis();
        order.push_status(self.new_status);

        match (prev, self.new_status) {
            (p, OrderStatus::Delivered) if p != OrderStatus::Delivered => {
                // Fulfillment is recorded here: stock was already reserved
                // at creation, so only the sold counter moves.
                for item in &order.items {
                    let mut product = store
                        .product_in(txn, item.product_id)?
                        .ok_or(OrderError::ProductNotFound(item.product_id))?;
                    product.sold += item.quantity;
                    product.updated_at = now;
                    store.put_product_in(txn, &product)?;
                }
                order.delivered_at = Some(now);
            }
            (OrderStatus::Delivered, OrderStatus::Cancelled) => {
                // 取消已签收订单：回滚销量并释放库存
                for item in &order.items {
                    let mut product = store
                        .product_in(txn, item.product_id)?
                        .ok_or(OrderError::ProductNotFound(item.product_id))?;
                    product.sold = (product.sold - item.quantity).max(0);
                    product.stock += item.quantity;
                    product.updated_at = now;
                    store.put_product_in(txn, &product)?;
                }
            }
            (_, OrderStatus::Cancelled) => {
                // Release the reservation; sold was never incremented.
                for item in &order.items {
                    let mut product = store
                        .product_in(txn, item.product_id)?
                        .ok_or(OrderError::ProductNotFound(item.product_id))?;
                    product.stock += item.quantity;
                    product.updated_at = now;
                    store.put_product_in(txn, &product)?;
                }
            }
            _ => {}
        }

        store.put_order_in(txn, &order)?;

        Ok(StatusUpdate {
            delivered: self.new_status == OrderStatus::Delivered,
            order,
        })
    }
}
