//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::PRODUCT_SEQ;
use crate::utils::{AppError, AppResult};
use shared::Product;

/// Create product payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must be non-negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "stock must be non-negative"))]
    pub stock: i64,
}

/// Create a product
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<Product>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let txn = state.store.begin_write()?;
    let id = state.store.next_id(&txn, PRODUCT_SEQ)?;
    let product = Product::new(id, payload.name, payload.description, payload.price, payload.stock);
    state.store.put_product_in(&txn, &product)?;
    txn.commit().map_err(crate::db::StoreError::from)?;

    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok(Json(product))
}

/// List all products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.store.products()?))
}

/// Get product by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Product>> {
    let product = state
        .store
        .product(id)?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}
