//! Order lifecycle actions
//!
//! Each operation is a small action struct executed against an open write
//! transaction. The manager owns the transaction boundary: it begins the
//! transaction, runs exactly one action, and commits — so an error anywhere
//! inside an action discards every mutation the action made.

mod create_order;
mod delete_order;
mod update_payment_status;
mod update_return;
mod update_status;

pub use create_order::{CreateOrderAction, NewOrderItem};
pub use delete_order::DeleteOrderAction;
pub use update_payment_status::UpdatePaymentStatusAction;
pub use update_return::UpdateReturnAction;
pub use update_status::{StatusUpdate, UpdateStatusAction};

use crate::db::Store;
use crate::orders::error::OrderResult;
use redb::WriteTransaction;

/// An order operation executed within one write transaction
pub trait OrderAction {
    type Output;

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<Self::Output>;
}
