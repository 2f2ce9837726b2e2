//! Gateway API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Create payment URL payload
#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub order_id: u64,
    pub amount: f64,
}

/// Signed redirect URL response
#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub payment_url: String,
    pub order_id: u64,
}

/// Best-effort client address for the gateway's `vnp_IpAddr` field
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Build the signed gateway redirect URL for an order
pub async fn create_payment_url(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUrlRequest>,
) -> AppResult<Json<CreateUrlResponse>> {
    // The order must exist before we send the customer to the gateway
    state
        .store
        .order(payload.order_id)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", payload.order_id)))?;

    let url = state.gateway.build_payment_url(
        payload.order_id,
        payload.amount,
        &client_ip(&headers),
    )?;

    Ok(Json(CreateUrlResponse {
        payment_url: url,
        order_id: payload.order_id,
    }))
}

/// Gateway redirect target.
///
/// Signature mismatch is a hard 400; a verified callback settles the payment
/// and redirects the customer to the frontend result page. There is no
/// duplicate-callback guard: re-processing re-sets the same terminal states.
pub async fn gateway_return(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Redirect> {
    let verified = state.gateway.verify_return(&query)?;

    let order_id: u64 = verified
        .order_ref
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid order reference: {}", verified.order_ref)))?;

    let success = verified.is_success();
    state
        .payments
        .settle_gateway_return(order_id, success, verified.transaction_no.clone())
        .await?;

    let target = if success {
        format!(
            "{}/payment/success?orderId={}",
            state.config.frontend_url, order_id
        )
    } else {
        let query = serde_urlencoded::to_string([
            ("orderId", order_id.to_string()),
            ("reason", verified.reason().to_string()),
        ])
        .unwrap_or_default();
        format!("{}/payment/failure?{}", state.config.frontend_url, query)
    };

    Ok(Redirect::to(&target))
}
