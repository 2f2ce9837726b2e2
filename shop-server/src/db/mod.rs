//! Database layer - embedded redb store
//!
//! All persisted state (orders, products, payments, carts) lives in a single
//! redb file; see [`storage`] for the table layout.

pub mod storage;

pub use storage::{Store, StoreError, StoreResult, ORDER_SEQ, PAYMENT_SEQ, PRODUCT_SEQ};
