//! DeleteOrder action
//!
//! Hard delete: the embedded items go with the row, and the payment attached
//! to the order is removed in the same transaction.

use crate::db::Store;
use crate::orders::actions::OrderAction;
use crate::orders::error::{OrderError, OrderResult};
use redb::WriteTransaction;

/// DeleteOrder action
#[derive(Debug, Clone)]
pub struct DeleteOrderAction {
    pub order_id: u64,
}

impl OrderAction for DeleteOrderAction {
    type Output = ();

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<()> {
        if !store.remove_order_in(txn, self.order_id)? {
            return Err(OrderError::OrderNotFound(self.order_id));
        }
        store.remove_payment_in(txn, self.order_id)?;
        Ok(())
    }
}
