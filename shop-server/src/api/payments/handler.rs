//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::payments::{CreatePayment, UpdatePayment};
use crate::utils::AppResult;
use shared::{Order, OrderPaymentStatus, Payment, PaymentMethod};

/// Create payment payload
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: u64,
    /// Accepted for API parity; the order already knows its owner.
    #[allow(dead_code)]
    pub user_id: Option<u64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub transaction_id: Option<String>,
}

/// Create the payment for an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .payments
        .create_payment(CreatePayment {
            order_id: payload.order_id,
            amount: payload.amount,
            method: payload.method,
            note: payload.note,
            transaction_id: payload.transaction_id,
        })
        .await?;
    Ok(Json(payment))
}

/// Reconcile payload
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: OrderPaymentStatus,
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub note: Option<String>,
}

/// Order with its payment attached
#[derive(Debug, Serialize)]
pub struct OrderWithPayment {
    #[serde(flatten)]
    pub order: Order,
    pub payment: Payment,
}

/// Reconcile an order's payment against an externally-requested status
pub async fn update(
    State(state): State<ServerState>,
    Path(order_id): Path<u64>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> AppResult<Json<OrderWithPayment>> {
    let (order, payment) = state
        .payments
        .update_payment(
            order_id,
            UpdatePayment {
                payment_status: payload.payment_status,
                amount: payload.amount,
                method: payload.method,
                note: payload.note,
            },
        )
        .await?;
    Ok(Json(OrderWithPayment { order, payment }))
}

/// Get the payment attached to an order
pub async fn get_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<u64>,
) -> AppResult<Json<Payment>> {
    let payment = state.payments.payment_by_order(order_id)?;
    Ok(Json(payment))
}

/// Complete payload
#[derive(Debug, Deserialize, Default)]
pub struct CompletePaymentRequest {
    pub transaction_id: Option<String>,
}

/// Manually complete a pending payment
pub async fn complete(
    State(state): State<ServerState>,
    Path(payment_id): Path<u64>,
    Json(payload): Json<CompletePaymentRequest>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .payments
        .complete_payment(payment_id, payload.transaction_id)
        .await?;
    Ok(Json(payment))
}

/// Refund payload
#[derive(Debug, Deserialize, Default)]
pub struct RefundPaymentRequest {
    pub note: Option<String>,
}

/// Manually refund a payment
pub async fn refund(
    State(state): State<ServerState>,
    Path(payment_id): Path<u64>,
    Json(payload): Json<RefundPaymentRequest>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .payments
        .refund_payment(payment_id, payload.note)
        .await?;
    Ok(Json(payment))
}
