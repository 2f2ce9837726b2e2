//! Product - catalog entry with stock/sold counters
//!
//! The lifecycle manager is the only writer of `stock` and `sold`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    /// Units available, never negative
    pub stock: i64,
    /// Units fulfilled, floored at zero on cancellation reversal
    pub sold: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    pub fn new(id: u64, name: String, description: Option<String>, price: f64, stock: i64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            name,
            description,
            price,
            stock,
            sold: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
