//! Cart line items, keyed per user

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product_id: u64,
    pub product_name: String,
    pub price: f64,
    pub quantity: i64,
}
