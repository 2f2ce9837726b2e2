//! PaymentService - reconciles Payment records against order state
//!
//! Auto-settling methods (momo/paypal/vnpay/bank) settle the moment the
//! payment row is created; COD stays pending until manual reconciliation.
//! Every mutation that touches both the payment and the order happens in one
//! write transaction so the two can never disagree after a crash.

use crate::db::{Store, StoreError, PAYMENT_SEQ};
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::RefundProvider;
use crate::utils::time;
use chrono::Utc;
use shared::{Order, OrderPaymentStatus, OrderStatus, Payment, PaymentMethod, PaymentStatus};
use std::sync::Arc;

/// Input for [`PaymentService::create_payment`]
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub order_id: u64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    /// External reference; generated when absent
    pub transaction_id: Option<String>,
}

/// Input for [`PaymentService::update_payment`]
#[derive(Debug, Clone)]
pub struct UpdatePayment {
    pub payment_status: OrderPaymentStatus,
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub note: Option<String>,
}

/// Payment reconciliation service
#[derive(Clone)]
pub struct PaymentService {
    store: Store,
    provider: Arc<dyn RefundProvider>,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService").finish()
    }
}

/// Time-and-order-derived external reference: `TXN<YYYYMMDDHHmmss><order_id>`
fn derive_transaction_id(order_id: u64) -> String {
    format!("TXN{}{}", time::gateway_timestamp(Utc::now()), order_id)
}

fn validate_amount(amount: f64) -> PaymentResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

impl PaymentService {
    pub fn new(store: Store, provider: Arc<dyn RefundProvider>) -> Self {
        Self { store, provider }
    }

    /// Create the payment for an order.
    ///
    /// Returns the existing payment unchanged when one is already attached
    /// (at-most-one invariant; no duplicate row is ever created).
    pub async fn create_payment(&self, input: CreatePayment) -> PaymentResult<Payment> {
        validate_amount(input.amount)?;

        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .order_in(&txn, input.order_id)?
            .ok_or(PaymentError::OrderNotFound(input.order_id))?;

        if order.payment_status == OrderPaymentStatus::Paid {
            return Err(PaymentError::OrderAlreadyPaid(order.id));
        }
        if order.status.is_terminal() {
            return Err(PaymentError::OrderClosed(order.id));
        }

        if let Some(existing) = self.store.payment_by_order_in(&txn, input.order_id)? {
            tracing::info!(
                order_id = input.order_id,
                payment_id = existing.id,
                "Payment already exists, returning it"
            );
            return Ok(existing);
        }

        let now = time::now_millis();
        let auto_settle = input.method.is_auto_settling();
        let payment = Payment {
            id: self.store.next_id(&txn, PAYMENT_SEQ)?,
            order_id: order.id,
            amount: input.amount,
            method: input.method,
            status: if auto_settle {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Pending
            },
            transaction_id: input
                .transaction_id
                .unwrap_or_else(|| derive_transaction_id(order.id)),
            payment_date: auto_settle.then_some(now),
            note: input.note,
            created_at: now,
        };
        self.store.put_payment_in(&txn, &payment)?;

        if auto_settle {
            order.payment_status = OrderPaymentStatus::Paid;
            if order.status == OrderStatus::Pending {
                order.push_status(OrderStatus::Confirmed);
            } else {
                order.updated_at = now;
            }
            self.store.put_order_in(&txn, &order)?;
        }

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(
            order_id = payment.order_id,
            payment_id = payment.id,
            method = %payment.method,
            status = %payment.status,
            "Payment created"
        );
        Ok(payment)
    }

    /// Reconcile an order's payment against an externally-requested status.
    ///
    /// Refunds for online methods clear with the provider first; a provider
    /// failure surfaces as a conflict and nothing is written.
    pub async fn update_payment(
        &self,
        order_id: u64,
        input: UpdatePayment,
    ) -> PaymentResult<(Order, Payment)> {
        if let Some(amount) = input.amount {
            validate_amount(amount)?;
        }

        let target = input.payment_status.as_payment_status();

        // Provider call happens outside the write transaction: it is slow,
        // remote, and must complete before any local state changes.
        if target == PaymentStatus::Refunded {
            let order = self
                .store
                .order(order_id)?
                .ok_or(PaymentError::OrderNotFound(order_id))?;
            if order.payment_method.is_online() {
                if let Some(payment) = self.store.payment_by_order(order_id)? {
                    self.provider
                        .refund(&payment, input.note.as_deref())
                        .await
                        .map_err(|e| PaymentError::RefundRejected(e.to_string()))?;
                }
            }
        }

        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .order_in(&txn, order_id)?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        let now = time::now_millis();
        let mut payment = match self.store.payment_by_order_in(&txn, order_id)? {
            Some(p) => p,
            None => Payment {
                id: self.store.next_id(&txn, PAYMENT_SEQ)?,
                order_id,
                amount: input.amount.unwrap_or(order.total_price),
                method: input.method.unwrap_or(order.payment_method),
                status: PaymentStatus::Pending,
                transaction_id: derive_transaction_id(order_id),
                payment_date: None,
                note: None,
                created_at: now,
            },
        };

        payment.status = target;
        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(method) = input.method {
            payment.method = method;
        }
        if input.note.is_some() {
            payment.note = input.note;
        }
        if target == PaymentStatus::Completed && payment.payment_date.is_none() {
            payment.payment_date = Some(now);
        }
        self.store.put_payment_in(&txn, &payment)?;

        // Mirror the resulting status back onto the order
        order.payment_status = input.payment_status;
        order.updated_at = now;
        self.store.put_order_in(&txn, &order)?;

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(
            order_id,
            payment_id = payment.id,
            status = %payment.status,
            "Payment reconciled"
        );
        Ok((order, payment))
    }

    /// Mark a payment completed (independent settlement path; kept consistent
    /// with the auto-settle branch of [`create_payment`]).
    pub async fn complete_payment(
        &self,
        payment_id: u64,
        transaction_id: Option<String>,
    ) -> PaymentResult<Payment> {
        let txn = self.store.begin_write()?;
        let mut payment = self
            .store
            .payment_by_id_in(&txn, payment_id)?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        let mut order = self
            .store
            .order_in(&txn, payment.order_id)?
            .ok_or(PaymentError::OrderNotFound(payment.order_id))?;

        let now = time::now_millis();
        payment.status = PaymentStatus::Completed;
        payment.payment_date = Some(now);
        if let Some(reference) = transaction_id {
            payment.transaction_id = reference;
        }
        self.store.put_payment_in(&txn, &payment)?;

        order.payment_status = OrderPaymentStatus::Paid;
        if order.status == OrderStatus::Pending {
            order.push_status(OrderStatus::Confirmed);
        } else {
            order.updated_at = now;
        }
        self.store.put_order_in(&txn, &order)?;

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(payment_id, order_id = payment.order_id, "Payment completed");
        Ok(payment)
    }

    /// Mark a payment refunded and mirror the order.
    pub async fn refund_payment(
        &self,
        payment_id: u64,
        note: Option<String>,
    ) -> PaymentResult<Payment> {
        let txn = self.store.begin_write()?;
        let mut payment = self
            .store
            .payment_by_id_in(&txn, payment_id)?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        let mut order = self
            .store
            .order_in(&txn, payment.order_id)?
            .ok_or(PaymentError::OrderNotFound(payment.order_id))?;

        payment.status = PaymentStatus::Refunded;
        if note.is_some() {
            payment.note = note;
        }
        self.store.put_payment_in(&txn, &payment)?;

        order.payment_status = OrderPaymentStatus::Refunded;
        order.updated_at = time::now_millis();
        self.store.put_order_in(&txn, &order)?;

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(payment_id, order_id = payment.order_id, "Payment refunded");
        Ok(payment)
    }

    /// Apply a verified gateway return.
    ///
    /// No idempotency guard: a duplicate callback re-sets the same terminal
    /// states, which is a no-op by construction.
    pub async fn settle_gateway_return(
        &self,
        order_id: u64,
        success: bool,
        gateway_reference: Option<String>,
    ) -> PaymentResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .order_in(&txn, order_id)?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        let now = time::now_millis();
        let mut payment = match self.store.payment_by_order_in(&txn, order_id)? {
            Some(p) => p,
            None => Payment {
                id: self.store.next_id(&txn, PAYMENT_SEQ)?,
                order_id,
                amount: order.total_price,
                method: PaymentMethod::Vnpay,
                status: PaymentStatus::Pending,
                transaction_id: derive_transaction_id(order_id),
                payment_date: None,
                note: None,
                created_at: now,
            },
        };

        if success {
            payment.status = PaymentStatus::Completed;
            payment.payment_date = Some(now);
            if let Some(reference) = gateway_reference {
                payment.transaction_id = reference;
            }
            order.payment_status = OrderPaymentStatus::Paid;
            if order.status == OrderStatus::Pending {
                order.push_status(OrderStatus::Confirmed);
            } else {
                order.updated_at = now;
            }
        } else {
            payment.status = PaymentStatus::Failed;
            order.payment_status = OrderPaymentStatus::Unpaid;
            order.updated_at = now;
        }

        self.store.put_payment_in(&txn, &payment)?;
        self.store.put_order_in(&txn, &order)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(
            order_id,
            success,
            status = %payment.status,
            "Gateway return settled"
        );
        Ok(order)
    }

    pub fn payment_by_order(&self, order_id: u64) -> PaymentResult<Payment> {
        self.store
            .payment_by_order(order_id)?
            .ok_or(PaymentError::PaymentNotFound(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::{CreateOrderAction, NewOrderItem, OrderAction};
    use crate::payments::provider::StubRefundProvider;
    use shared::Product;

    fn service_with(provider: StubRefundProvider) -> PaymentService {
        PaymentService::new(Store::open_in_memory().unwrap(), Arc::new(provider))
    }

    fn seed_order(service: &PaymentService, method: PaymentMethod) -> Order {
        let txn = service.store.begin_write().unwrap();
        service
            .store
            .put_product_in(&txn, &Product::new(1, "Keyboard".to_string(), None, 49.5, 5))
            .unwrap();
        let order = CreateOrderAction {
            user_id: 1,
            shipping_address: "12 Elm Street".to_string(),
            payment_method: method,
            note: None,
            items: vec![NewOrderItem {
                product_id: 1,
                product_name: "Keyboard".to_string(),
                quantity: 2,
                price: 49.5,
            }],
        }
        .execute(&txn, &service.store)
        .unwrap();
        txn.commit().unwrap();
        order
    }

    fn create_input(order_id: u64, method: PaymentMethod) -> CreatePayment {
        CreatePayment {
            order_id,
            amount: 99.0,
            method,
            note: None,
            transaction_id: None,
        }
    }

    #[tokio::test]
    async fn test_auto_settling_method_settles_immediately() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Vnpay);

        let payment = service
            .create_payment(create_input(order.id, PaymentMethod::Vnpay))
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.payment_date.is_some());
        assert!(payment.transaction_id.starts_with("TXN"));

        let order = service.store.order(order.id).unwrap().unwrap();
        assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Confirmed);
        // Pending → Confirmed is on the audit log
        assert_eq!(order.confirmation_history.len(), 2);
    }

    #[tokio::test]
    async fn test_manual_method_stays_pending() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Cod);

        let payment = service
            .create_payment(create_input(order.id, PaymentMethod::Cod))
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.payment_date.is_none());

        let order = service.store.order(order.id).unwrap().unwrap();
        assert_eq!(order.payment_status, OrderPaymentStatus::Unpaid);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_second_create_returns_existing_payment() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Cod);

        let first = service
            .create_payment(create_input(order.id, PaymentMethod::Cod))
            .await
            .unwrap();
        let second = service
            .create_payment(create_input(order.id, PaymentMethod::Cod))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.transaction_id, second.transaction_id);
    }

    #[tokio::test]
    async fn test_create_rejected_for_paid_order() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Vnpay);
        service
            .create_payment(create_input(order.id, PaymentMethod::Vnpay))
            .await
            .unwrap();

        // The order is now paid; a fresh payment attempt must be refused
        // even though the row-exists check would also catch it.
        let result = service
            .create_payment(create_input(order.id, PaymentMethod::Vnpay))
            .await;
        assert!(matches!(result, Err(PaymentError::OrderAlreadyPaid(_))));
    }

    #[tokio::test]
    async fn test_update_payment_creates_row_when_absent() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Cod);

        let (order, payment) = service
            .update_payment(
                order.id,
                UpdatePayment {
                    payment_status: OrderPaymentStatus::Paid,
                    amount: None,
                    method: None,
                    note: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.amount, order.total_price);
        assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_refund_clears_with_provider_first() {
        let service = service_with(StubRefundProvider::failing("insufficient provider balance"));
        let order = seed_order(&service, PaymentMethod::Paypal);
        service
            .create_payment(create_input(order.id, PaymentMethod::Paypal))
            .await
            .unwrap();

        let result = service
            .update_payment(
                order.id,
                UpdatePayment {
                    payment_status: OrderPaymentStatus::Refunded,
                    amount: None,
                    method: None,
                    note: None,
                },
            )
            .await;

        match result {
            Err(PaymentError::RefundRejected(reason)) => {
                assert!(reason.contains("insufficient provider balance"));
            }
            other => panic!("Expected RefundRejected, got {:?}", other),
        }

        // Nothing was written
        let payment = service.payment_by_order(order.id).unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        let order = service.store.order(order.id).unwrap().unwrap();
        assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_refund_for_cod_skips_provider() {
        // A failing provider proves COD never consults it
        let service = service_with(StubRefundProvider::failing("should not be called"));
        let order = seed_order(&service, PaymentMethod::Cod);
        service
            .create_payment(create_input(order.id, PaymentMethod::Cod))
            .await
            .unwrap();

        let (order, payment) = service
            .update_payment(
                order.id,
                UpdatePayment {
                    payment_status: OrderPaymentStatus::Refunded,
                    amount: None,
                    method: None,
                    note: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(order.payment_status, OrderPaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_complete_payment_mirrors_order() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Cod);
        let payment = service
            .create_payment(create_input(order.id, PaymentMethod::Cod))
            .await
            .unwrap();

        let completed = service
            .complete_payment(payment.id, Some("BANKREF42".to_string()))
            .await
            .unwrap();

        assert_eq!(completed.status, PaymentStatus::Completed);
        assert_eq!(completed.transaction_id, "BANKREF42");
        assert!(completed.payment_date.is_some());

        let order = service.store.order(order.id).unwrap().unwrap();
        assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_refund_payment_mirrors_order() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Vnpay);
        let payment = service
            .create_payment(create_input(order.id, PaymentMethod::Vnpay))
            .await
            .unwrap();

        let refunded = service
            .refund_payment(payment.id, Some("customer request".to_string()))
            .await
            .unwrap();

        assert_eq!(refunded.status, PaymentStatus::Refunded);
        let order = service.store.order(order.id).unwrap().unwrap();
        assert_eq!(order.payment_status, OrderPaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_gateway_return_success_and_duplicate() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Vnpay);

        let settled = service
            .settle_gateway_return(order.id, true, Some("GW123".to_string()))
            .await
            .unwrap();
        assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);
        assert_eq!(settled.status, OrderStatus::Confirmed);

        let payment = service.payment_by_order(order.id).unwrap();
        assert_eq!(payment.transaction_id, "GW123");

        // Duplicate delivery of the same callback re-sets the same states
        let again = service
            .settle_gateway_return(order.id, true, Some("GW123".to_string()))
            .await
            .unwrap();
        assert_eq!(again.payment_status, OrderPaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_gateway_return_failure_marks_unpaid() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Vnpay);

        let settled = service
            .settle_gateway_return(order.id, false, None)
            .await
            .unwrap();
        assert_eq!(settled.payment_status, OrderPaymentStatus::Unpaid);
        assert_eq!(settled.status, OrderStatus::Pending);

        let payment = service.payment_by_order(order.id).unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_invalid_amount_rejected() {
        let service = service_with(StubRefundProvider::succeeding());
        let order = seed_order(&service, PaymentMethod::Cod);

        for bad in [0.0, -5.0, f64::NAN] {
            let mut input = create_input(order.id, PaymentMethod::Cod);
            input.amount = bad;
            let result = service.create_payment(input).await;
            assert!(matches!(result, Err(PaymentError::InvalidAmount(_))));
        }
    }
}
