//! Order lifecycle module
//!
//! - **actions**: one struct per operation, executed inside a single write
//!   transaction
//! - **manager**: owns the transaction boundary and post-commit effects
//! - **money**: decimal arithmetic for totals and line subtotals
//!
//! # Operation Flow
//!
//! ```text
//! HTTP handler → OrderManager → Action → Store (redb)
//!                     ↓
//!              Notifier (post-commit, Delivered only)
//! ```

pub mod actions;
pub mod error;
pub mod manager;
pub mod money;

pub use actions::{CreateOrderAction, NewOrderItem};
pub use error::{OrderError, OrderResult};
pub use manager::OrderManager;
