//! UpdateReturn action - per-item return workflow
//!
//! `None → Requested → Approved | Rejected`, `Approved → Completed`.

use crate::db::Store;
use crate::orders::actions::OrderAction;
use crate::orders::error::{OrderError, OrderResult};
use redb::WriteTransaction;
use shared::{Order, ReturnStatus};

/// UpdateReturn action
#[derive(Debug, Clone)]
pub struct UpdateReturnAction {
    pub order_id: u64,
    pub product_id: u64,
    pub return_status: ReturnStatus,
    pub reason: Option<String>,
}

fn transition_allowed(from: ReturnStatus, to: ReturnStatus) -> bool {
    matches!(
        (from, to),
        (ReturnStatus::None, ReturnStatus::Requested)
            | (ReturnStatus::Requested, ReturnStatus::Approved)
            | (ReturnStatus::Requested, ReturnStatus::Rejected)
            | (ReturnStatus::Approved, ReturnStatus::Completed)
    )
}

impl OrderAction for UpdateReturnAction {
    type Output = Order;

    fn execute(&self, txn: &WriteTransaction, store: &Store) -> OrderResult<Order> {
        let mut order = store
            .order_in(txn, self.order_id)?
            .ok_or(OrderError::OrderNotFound(self.order_id))?;

        let now = crate::utils::time::now_millis();
        {
            let item = order
                .item_mut(self.product_id)
                .ok_or(OrderError::ItemNotFound {
                    order_id: self.order_id,
                    product_id: self.product_id,
                })?;

            if !transition_allowed(item.return_status, self.return_status) {
                return Err(OrderError::Validation(format!(
                    "Return cannot move from {:?} to {:?}",
                    item.return_status, self.return_status
                )));
            }

            item.return_status = self.return_status;
            match self.return_status {
                ReturnStatus::Requested => {
                    item.return_requested_at = Some(now);
                    item.return_reason = self.reason.clone();
                }
                ReturnStatus::Approved | ReturnStatus::Rejected | ReturnStatus::Completed => {
                    item.return_resolved_at = Some(now);
                }
                ReturnStatus::None => {}
            }
        }

        order.updated_at = now;
        store.put_order_in(txn, &order)?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::{CreateOrderAction, NewOrderItem};
    use shared::{PaymentMethod, Product};

    fn seed_order(store: &Store) -> Order {
        let txn = store.begin_write().unwrap();
        store
            .put_product_in(&txn, &Product::new(1, "Keyboard".to_string(), None, 49.5, 5))
            .unwrap();
        let order = CreateOrderAction {
            user_id: 1,
            shipping_address: "12 Elm Street".to_string(),
            payment_method: PaymentMethod::Cod,
            note: None,
            items: vec![NewOrderItem {
                product_id: 1,
                product_name: "Keyboard".to_string(),
                quantity: 1,
                price: 49.5,
            }],
        }
        .execute(&txn, &store)
        .unwrap();
        txn.commit().unwrap();
        order
    }

    fn apply(store: &Store, order_id: u64, status: ReturnStatus, reason: Option<&str>) -> OrderResult<Order> {
        let txn = store.begin_write().unwrap();
        let result = UpdateReturnAction {
            order_id,
            product_id: 1,
            return_status: status,
            reason: reason.map(String::from),
        }
        .execute(&txn, store);
        if result.is_ok() {
            txn.commit().unwrap();
        }
        result
    }

    #[test]
    fn test_full_return_workflow() {
        let store = Store::open_in_memory().unwrap();
        let order = seed_order(&store);

        let o = apply(&store, order.id, ReturnStatus::Requested, Some("damaged")).unwrap();
        assert_eq!(o.items[0].return_status, ReturnStatus::Requested);
        assert_eq!(o.items[0].return_reason.as_deref(), Some("damaged"));
        assert!(o.items[0].return_requested_at.is_some());

        let o = apply(&store, order.id, ReturnStatus::Approved, None).unwrap();
        assert!(o.items[0].return_resolved_at.is_some());

        let o = apply(&store, order.id, ReturnStatus::Completed, None).unwrap();
        assert_eq!(o.items[0].return_status, ReturnStatus::Completed);
    }

    #[test]
    fn test_invalid_return_jump_rejected() {
        let store = Store::open_in_memory().unwrap();
        let order = seed_order(&store);

        // None → Completed is not a legal move
        let result = apply(&store, order.id, ReturnStatus::Completed, None);
        assert!(matches!(result, Err(OrderError::Validation(_))));

        // Rejected is final
        apply(&store, order.id, ReturnStatus::Requested, None).unwrap();
        apply(&store, order.id, ReturnStatus::Rejected, None).unwrap();
        let result = apply(&store, order.id, ReturnStatus::Approved, None);
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_unknown_item_fails() {
        let store = Store::open_in_memory().unwrap();
        let order = seed_order(&store);

        let txn = store.begin_write().unwrap();
        let result = UpdateReturnAction {
            order_id: order.id,
            product_id: 99,
            return_status: ReturnStatus::Requested,
            reason: None,
        }
        .execute(&txn, &store);
        assert!(matches!(result, Err(OrderError::ItemNotFound { .. })));
    }
}
