//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::orders::actions::{CreateOrderAction, NewOrderItem};
use crate::utils::{AppError, AppResult};
use shared::{Order, OrderPaymentStatus, OrderStatus, PaymentMethod, ReturnStatus};

/// Line item as submitted at checkout
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Create order payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub user_id: u64,
    #[validate(length(min = 1, message = "shipping_address is required"))]
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

/// Create an order (atomic: stock reservation + cart consumption)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let action = CreateOrderAction {
        user_id: payload.user_id,
        shipping_address: payload.shipping_address,
        payment_method: payload.payment_method,
        note: payload.note,
        items: payload
            .items
            .into_iter()
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                product_name: i.product_name,
                quantity: i.quantity,
                price: i.price,
            })
            .collect(),
    };

    let order = state.orders.create_order(action).await?;
    Ok(Json(order))
}

/// List all orders
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.orders()?;
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Order>> {
    let order = state.orders.order(id)?;
    Ok(Json(order))
}

/// Delete order (cascades to items and payment)
pub async fn remove(State(state): State<ServerState>, Path(id): Path<u64>) -> AppResult<Json<()>> {
    state.orders.delete_order(id).await?;
    Ok(Json(()))
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Drive the order state machine
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state.orders.update_status(id, payload.status).await?;
    Ok(Json(order))
}

/// Payment status request — the closed enum rejects anything outside
/// {UNPAID, PAID, REFUNDED} before this handler runs.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: OrderPaymentStatus,
}

/// Overwrite the derived payment status
pub async fn update_payment_status(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .update_payment_status(id, payload.payment_status)
        .await?;
    Ok(Json(order))
}

/// Return workflow request
#[derive(Debug, Deserialize)]
pub struct UpdateReturnRequest {
    pub return_status: ReturnStatus,
    pub reason: Option<String>,
}

/// Per-item return workflow
pub async fn update_return(
    State(state): State<ServerState>,
    Path((id, product_id)): Path<(u64, u64)>,
    Json(payload): Json<UpdateReturnRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .update_return_status(id, product_id, payload.return_status, payload.reason)
        .await?;
    Ok(Json(order))
}
