//! End-to-end lifecycle flows against an on-disk store
//!
//! These tests drive the public service layer the way the HTTP handlers do:
//! seed a catalog, place orders, walk the state machine, and reconcile
//! payments — asserting the stock/sold bookkeeping at every step.

use std::sync::Arc;

use shop_server::db::{Store, PRODUCT_SEQ};
use shop_server::notify::NoopNotifier;
use shop_server::orders::actions::{CreateOrderAction, NewOrderItem};
use shop_server::orders::OrderManager;
use shop_server::payments::{CreatePayment, PaymentService, StubRefundProvider, UpdatePayment};
use shared::{OrderPaymentStatus, OrderStatus, PaymentMethod, PaymentStatus, Product};

struct Harness {
    _dir: tempfile::TempDir,
    store: Store,
    orders: OrderManager,
    payments: PaymentService,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("shop.redb")).unwrap();
    let orders = OrderManager::new(store.clone(), Arc::new(NoopNotifier));
    let payments = PaymentService::new(store.clone(), Arc::new(StubRefundProvider::succeeding()));
    Harness {
        _dir: dir,
        store,
        orders,
        payments,
    }
}

fn seed_product(h: &Harness, name: &str, price: f64, stock: i64) -> u64 {
    let txn = h.store.begin_write().unwrap();
    let id = h.store.next_id(&txn, PRODUCT_SEQ).unwrap();
    h.store
        .put_product_in(&txn, &Product::new(id, name.to_string(), None, price, stock))
        .unwrap();
    txn.commit().unwrap();
    id
}

fn order_action(product_id: u64, name: &str, quantity: i64, price: f64) -> CreateOrderAction {
    CreateOrderAction {
        user_id: 1,
        shipping_address: "12 Elm Street".to_string(),
        payment_method: PaymentMethod::Cod,
        note: None,
        items: vec![NewOrderItem {
            product_id,
            product_name: name.to_string(),
            quantity,
            price,
        }],
    }
}

#[tokio::test]
async fn full_lifecycle_reserves_fulfills_and_reverses() {
    let h = harness();
    let product_id = seed_product(&h, "Keyboard", 49.5, 5);

    // Create: stock 5 → 3 (reservation), sold stays 0
    let order = h
        .orders
        .create_order(order_action(product_id, "Keyboard", 2, 49.5))
        .await
        .unwrap();
    let p = h.store.product(product_id).unwrap().unwrap();
    assert_eq!((p.stock, p.sold), (3, 0));
    assert_eq!(order.total_price, 99.0);

    // Deliver: sold 0 → 2, reservation stands
    let order = h
        .orders
        .update_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.delivered_at.is_some());
    let p = h.store.product(product_id).unwrap().unwrap();
    assert_eq!((p.stock, p.sold), (3, 2));

    // Cancel the delivered order: stock 3 → 5, sold 2 → 0
    let order = h
        .orders
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    let p = h.store.product(product_id).unwrap().unwrap();
    assert_eq!((p.stock, p.sold), (5, 0));

    // History recorded every accepted transition
    let statuses: Vec<OrderStatus> = order
        .confirmation_history
        .iter()
        .map(|c| c.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ]
    );
}

#[tokio::test]
async fn oversell_is_rejected_atomically() {
    let h = harness();
    let keyboard = seed_product(&h, "Keyboard", 49.5, 5);
    let mouse = seed_product(&h, "Mouse", 15.0, 1);

    let mut action = order_action(keyboard, "Keyboard", 4, 49.5);
    action.items.push(NewOrderItem {
        product_id: mouse,
        product_name: "Mouse".to_string(),
        quantity: 2,
        price: 15.0,
    });

    let result = h.orders.create_order(action).await;
    assert!(result.is_err());

    // Neither product moved, no order persisted
    assert_eq!(h.store.product(keyboard).unwrap().unwrap().stock, 5);
    assert_eq!(h.store.product(mouse).unwrap().unwrap().stock, 1);
    assert!(h.orders.orders().unwrap().is_empty());
}

#[tokio::test]
async fn auto_settling_payment_confirms_pending_order() {
    let h = harness();
    let product_id = seed_product(&h, "Monitor", 100000.0, 10);

    let mut action = order_action(product_id, "Monitor", 1, 100000.0);
    action.payment_method = PaymentMethod::Vnpay;
    let order = h.orders.create_order(action).await.unwrap();

    let payment = h
        .payments
        .create_payment(CreatePayment {
            order_id: order.id,
            amount: 100000.0,
            method: PaymentMethod::Vnpay,
            note: None,
            transaction_id: None,
        })
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Completed);

    let order = h.store.order(order.id).unwrap().unwrap();
    assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    assert_eq!(order.status, OrderStatus::Confirmed);

    // The settlement path never touches fulfillment bookkeeping
    let p = h.store.product(product_id).unwrap().unwrap();
    assert_eq!((p.stock, p.sold), (9, 0));
}

#[tokio::test]
async fn duplicate_create_payment_returns_existing_row() {
    let h = harness();
    let product_id = seed_product(&h, "Desk", 200.0, 3);
    let order = h
        .orders
        .create_order(order_action(product_id, "Desk", 1, 200.0))
        .await
        .unwrap();

    let input = CreatePayment {
        order_id: order.id,
        amount: 200.0,
        method: PaymentMethod::Cod,
        note: None,
        transaction_id: None,
    };
    let first = h.payments.create_payment(input.clone()).await.unwrap();
    let second = h.payments.create_payment(input).await.unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn cod_reconciliation_and_refund_round_trip() {
    let h = harness();
    let product_id = seed_product(&h, "Chair", 80.0, 4);
    let order = h
        .orders
        .create_order(order_action(product_id, "Chair", 1, 80.0))
        .await
        .unwrap();

    // Reconcile to paid (creates the payment row on the fly)
    let (order, payment) = h
        .payments
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
    assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    assert_eq!(payment.status, PaymentStatus::Completed);

    // Refund through the manual path
    let refunded = h
        .payments
        .refund_payment(payment.id, Some("courier lost the parcel".to_string()))
        .await
        .unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);

    let order = h.store.order(order.id).unwrap().unwrap();
    assert_eq!(order.payment_status, OrderPaymentStatus::Refunded);
}

#[tokio::test]
async fn gateway_settlement_paths() {
    let h = harness();
    let product_id = seed_product(&h, "Lamp", 30.0, 8);
    let mut action = order_action(product_id, "Lamp", 2, 30.0);
    action.payment_method = PaymentMethod::Vnpay;
    let order = h.orders.create_order(action).await.unwrap();

    // Failed callback: payment failed, order stays unpaid and pending
    let settled = h
        .payments
        .settle_gateway_return(order.id, false, None)
        .await
        .unwrap();
    assert_eq!(settled.payment_status, OrderPaymentStatus::Unpaid);
    assert_eq!(settled.status, OrderStatus::Pending);

    // Customer retries and the gateway approves
    let settled = h
        .payments
        .settle_gateway_return(order.id, true, Some("GW777".to_string()))
        .await
        .unwrap();
    assert_eq!(settled.payment_status, OrderPaymentStatus::Paid);
    assert_eq!(settled.status, OrderStatus::Confirmed);

    let payment = h.payments.payment_by_order(order.id).unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.transaction_id, "GW777");
}
