//! UpdatePaymentStatus action
//!
//! The status vocabulary is the closed [`OrderPaymentStatus`] enum, so
//! out-of-vocabulary values never reach this code: they are rejected at the
//! deserialization boundary with a validation error and no mutation.

use crate::db::Store;
use crate::orders::actions::OrderAction;
use crate::orders::error::{OrderError, OrderResult};
use redb::WriteTransaction;
use shared::{Order, OrderPaymentStatus};

/// UpdatePaymentStatus action
#[derive(Debug, Clone)]
pub struct UpdatePaymentStatusAction {
    pub order_id: u64,
    pub payment_status: OrderPaymentStatus,
}

impl OrderAction for UpdatePaymentStatusAction {
    type Output = Order;

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<Order> {
        let mut order = store
            .order_in(txn, self.order_id)?
            .ok_or(OrderError::OrderNotFound(self.order_id))?;

        order.payment_status = self.payment_status;
        order.updated_at = crate::utils::time::now_millis();
        store.put_order_in(txn, &order)?;

        Ok(order)
    }
}
