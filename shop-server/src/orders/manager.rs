//! OrderManager - transaction boundary for the order lifecycle
//!
//! # Operation Flow
//!
//! ```text
//! manager.update_status(id, status)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Execute exactly one action
//!     ├─ 3. Commit (or drop on error — nothing partial ever lands)
//!     └─ 4. Post-commit effects (delivery notification, fire-and-forget)
//! ```

use crate::db::Store;
use crate::notify::Notifier;
use crate::orders::actions::{
    CreateOrderAction, DeleteOrderAction, OrderAction, UpdatePaymentStatusAction,
    UpdateReturnAction, UpdateStatusAction,
};
use crate::orders::error::{OrderError, OrderResult};
use shared::{Order, OrderPaymentStatus, OrderStatus, ReturnStatus};
use std::sync::Arc;

/// Order lifecycle manager
#[derive(Clone)]
pub struct OrderManager {
    store: Store,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("store", &self.store)
            .finish()
    }
}

impl OrderManager {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create an order: snapshot items, reserve stock, consume cart lines.
    pub async fn create_order(&self, action: CreateOrderAction) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let order = action.execute(&txn, &self.store)?;
        txn.commit().map_err(crate::db::StoreError::from)?;

        tracing::info!(
            order_id = order.id,
            user_id = order.user_id,
            total = order.total_price,
            "Order created"
        );
        Ok(order)
    }

    /// Drive the order state machine; notifies the user after a commit that
    /// lands in Delivered. Notification failure never rolls anything back.
    pub async fn update_status(&self, order_id: u64, new_status: OrderStatus) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let update = UpdateStatusAction {
            order_id,
            new_status,
        }
        .execute(&txn, &self.store)?;
        txn.commit().map_err(crate::db::StoreError::from)?;

        tracing::info!(order_id, status = %new_status, "Order status updated");

        if update.delivered {
            let notifier = self.notifier.clone();
            let order = update.order.clone();
            tokio::spawn(async move {
                notifier.order_delivered(&order).await;
            });
        }

        Ok(update.order)
    }

    /// Overwrite the derived payment status (admin reconciliation path).
    pub async fn update_payment_status(
        &self,
        order_id: u64,
        payment_status: OrderPaymentStatus,
    ) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let order = UpdatePaymentStatusAction {
            order_id,
            payment_status,
        }
        .execute(&txn, &self.store)?;
        txn.commit().map_err(crate::db::StoreError::from)?;

        tracing::info!(order_id, payment_status = %payment_status, "Order payment status updated");
        Ok(order)
    }

    /// Per-item return workflow.
    pub async fn update_return_status(
        &self,
        order_id: u64,
        product_id: u64,
        return_status: ReturnStatus,
        reason: Option<String>,
    ) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let order = UpdateReturnAction {
            order_id,
            product_id,
            return_status,
            reason,
        }
        .execute(&txn, &self.store)?;
        txn.commit().map_err(crate::db::StoreError::from)?;
        Ok(order)
    }

    /// Hard delete (cascades to items and payment).
    pub async fn delete_order(&self, order_id: u64) -> OrderResult<()> {
        let txn = self.store.begin_write()?;
        DeleteOrderAction { order_id }.execute(&txn, &self.store)?;
        txn.commit().map_err(crate::db::StoreError::from)?;

        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    pub fn order(&self, order_id: u64) -> OrderResult<Order> {
        self.store
            .order(order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub fn orders(&self) -> OrderResult<Vec<Order>> {
        Ok(self.store.orders()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::orders::actions::NewOrderItem;
    use shared::{PaymentMethod, Product};

    fn manager() -> OrderManager {
        OrderManager::new(Store::open_in_memory().unwrap(), Arc::new(NoopNotifier))
    }

    fn seed_product(manager: &OrderManager, stock: i64) {
        let txn = manager.store.begin_write().unwrap();
        manager
            .store
            .put_product_in(&txn, &Product::new(1, "Keyboard".to_string(), None, 49.5, stock))
            .unwrap();
        txn.commit().unwrap();
    }

    fn create_action(quantity: i64) -> CreateOrderAction {
        CreateOrderAction {
            user_id: 1,
            shipping_address: "12 Elm Street".to_string(),
            payment_method: PaymentMethod::Cod,
            note: None,
            items: vec![NewOrderItem {
                product_id: 1,
                product_name: "Keyboard".to_string(),
                quantity,
                price: 49.5,
            }],
        }
    }

    #[tokio::test]
    async fn test_failed_create_commits_nothing() {
        let m = manager();
        seed_product(&m, 1);

        let result = m.create_order(create_action(2)).await;
        assert!(matches!(result, Err(OrderError::InsufficientStock { .. })));

        assert_eq!(m.store.product(1).unwrap().unwrap().stock, 1);
        assert!(m.orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_lifecycle_through_manager() {
        let m = manager();
        seed_product(&m, 5);

        let order = m.create_order(create_action(2)).await.unwrap();
        assert_eq!(m.store.product(1).unwrap().unwrap().stock, 3);

        let order = m.update_status(order.id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        let product = m.store.product(1).unwrap().unwrap();
        assert_eq!(product.stock, 3);
        assert_eq!(product.sold, 2);

        m.update_status(order.id, OrderStatus::Cancelled).await.unwrap();
        let product = m.store.product(1).unwrap().unwrap();
        assert_eq!(product.stock, 5);
        assert_eq!(product.sold, 0);
    }

    #[tokio::test]
    async fn test_rejected_transition_leaves_history_untouched() {
        let m = manager();
        seed_product(&m, 5);
        let order = m.create_order(create_action(1)).await.unwrap();
        m.update_status(order.id, OrderStatus::Cancelled).await.unwrap();

        let result = m.update_status(order.id, OrderStatus::Shipped).await;
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));

        let loaded = m.order(order.id).unwrap();
        assert_eq!(loaded.confirmation_history.len(), 2);
    }
}
