//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::CartLine;

/// List a user's cart
pub async fn list(
    State(state): State<ServerState>,
    Path(user_id): Path<u64>,
) -> AppResult<Json<Vec<CartLine>>> {
    Ok(Json(state.store.cart(user_id)?))
}

/// Add item payload
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: u64,
    pub quantity: i64,
}

/// Add an item to the cart (quantities merge for an existing product)
pub async fn add_item(
    State(state): State<ServerState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<Vec<CartLine>>> {
    if payload.quantity <= 0 {
        return Err(AppError::validation("quantity must be positive"));
    }

    let txn = state.store.begin_write()?;
    let product = state
        .store
        .product_in(&txn, payload.product_id)?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", payload.product_id)))?;

    let mut lines = state.store.cart_in(&txn, user_id)?;
    match lines.iter_mut().find(|l| l.product_id == payload.product_id) {
        Some(line) => line.quantity += payload.quantity,
        None => lines.push(CartLine {
            product_id: product.id,
            product_name: product.name,
            price: product.price,
            quantity: payload.quantity,
        }),
    }
    state.store.put_cart_in(&txn, user_id, &lines)?;
    txn.commit().map_err(crate::db::StoreError::from)?;

    Ok(Json(lines))
}

/// Remove one product's line from the cart
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((user_id, product_id)): Path<(u64, u64)>,
) -> AppResult<Json<Vec<CartLine>>> {
    let txn = state.store.begin_write()?;
    let mut lines = state.store.cart_in(&txn, user_id)?;
    lines.retain(|l| l.product_id != product_id);
    state.store.put_cart_in(&txn, user_id, &lines)?;
    txn.commit().map_err(crate::db::StoreError::from)?;

    Ok(Json(lines))
}

/// Clear the whole cart
pub async fn clear(
    State(state): State<ServerState>,
    Path(user_id): Path<u64>,
) -> AppResult<Json<()>> {
    let txn = state.store.begin_write()?;
    state.store.put_cart_in(&txn, user_id, &[])?;
    txn.commit().map_err(crate::db::StoreError::from)?;

    Ok(Json(()))
}
