//! redb-based storage layer for orders, products, payments and carts
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order aggregate (items + history embedded) |
//! | `products` | `product_id` | `Product` | Catalog with stock/sold counters |
//! | `payments` | `order_id` | `Payment` | At most one payment per order |
//! | `payment_index` | `payment_id` | `order_id` | Lookup payments by their own id |
//! | `carts` | `user_id` | `Vec<CartLine>` | Per-user cart lines |
//! | `sequences` | name | `u64` | Id counters |
//!
//! # Atomicity
//!
//! Every stock-affecting operation runs inside a single [`WriteTransaction`]:
//! the caller opens the transaction, performs all reads and writes through
//! the `*_in` helpers, and commits once. An error at any step drops the
//! transaction and none of the mutations become visible.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::{CartLine, Order, Payment, Product};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for order aggregates: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Table for products: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("products");

/// Table for payments: key = order_id (enforces the 1:1 shape at the key level)
const PAYMENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("payments");

/// Secondary index: payment_id -> order_id
const PAYMENT_INDEX_TABLE: TableDefinition<u64, u64> = TableDefinition::new("payment_index");

/// Table for carts: key = user_id, value = JSON-serialized Vec<CartLine>
const CARTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("carts");

/// Table for id counters: key = counter name, value = u64
const SEQUENCES_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

pub const ORDER_SEQ: &str = "order";
pub const PRODUCT_SEQ: &str = "product";
pub const PAYMENT_SEQ: &str = "payment";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Embedded store backed by redb
///
/// redb commits with `Durability::Immediate`: once `commit()` returns the
/// data is on disk and the file is always in a consistent state, so partial
/// stock/sold mutations are never observable.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish()
    }
}

impl Store {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(PRODUCTS_TABLE)?;
            let _ = txn.open_table(PAYMENTS_TABLE)?;
            let _ = txn.open_table(PAYMENT_INDEX_TABLE)?;
            let _ = txn.open_table(CARTS_TABLE)?;
            let _ = txn.open_table(SEQUENCES_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (the sole concurrency-control primitive)
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Allocate the next id for the given counter (within the transaction)
    pub fn next_id(&self, txn: &WriteTransaction, counter: &str) -> StoreResult<u64> {
        let mut table = txn.open_table(SEQUENCES_TABLE)?;
        let current = table.get(counter)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(counter, next)?;
        Ok(next)
    }

    // ========== Order Operations (transactional) ==========

    pub fn order_in(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_order_in(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id, bytes.as_slice())?;
        Ok(())
    }

    /// Remove an order; returns whether it existed
    pub fn remove_order_in(&self, txn: &WriteTransaction, id: u64) -> StoreResult<bool> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        Ok(table.remove(id)?.is_some())
    }

    // ========== Order Operations (read-only) ==========

    pub fn order(&self, id: u64) -> StoreResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn orders(&self) -> StoreResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Product Operations ==========

    pub fn product_in(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_product_in(&self, txn: &WriteTransaction, product: &Product) -> StoreResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let bytes = serde_json::to_vec(product)?;
        table.insert(product.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn product(&self, id: u64) -> StoreResult<Option<Product>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn products(&self) -> StoreResult<Vec<Product>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    // ========== Payment Operations ==========

    pub fn payment_by_order_in(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<Option<Payment>> {
        let table = txn.open_table(PAYMENTS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace the payment for its order, keeping the id index in sync
    pub fn put_payment_in(&self, txn: &WriteTransaction, payment: &Payment) -> StoreResult<()> {
        {
            let mut table = txn.open_table(PAYMENTS_TABLE)?;
            let bytes = serde_json::to_vec(payment)?;
            table.insert(payment.order_id, bytes.as_slice())?;
        }
        let mut index = txn.open_table(PAYMENT_INDEX_TABLE)?;
        index.insert(payment.id, payment.order_id)?;
        Ok(())
    }

    /// Resolve a payment by its own id via the secondary index
    pub fn payment_by_id_in(
        &self,
        txn: &WriteTransaction,
        payment_id: u64,
    ) -> StoreResult<Option<Payment>> {
        let order_id = {
            let index = txn.open_table(PAYMENT_INDEX_TABLE)?;
            index.get(payment_id)?.map(|g| g.value())
        };
        match order_id {
            Some(order_id) => self.payment_by_order_in(txn, order_id),
            None => Ok(None),
        }
    }

    /// Remove the payment attached to an order (order deletion cascade)
    pub fn remove_payment_in(&self, txn: &WriteTransaction, order_id: u64) -> StoreResult<()> {
        let removed: Option<Payment> = {
            let mut table = txn.open_table(PAYMENTS_TABLE)?;
            match table.remove(order_id)? {
                Some(guard) => Some(serde_json::from_slice(guard.value())?),
                None => None,
            }
        };
        if let Some(payment) = removed {
            let mut index = txn.open_table(PAYMENT_INDEX_TABLE)?;
            index.remove(payment.id)?;
        }
        Ok(())
    }

    pub fn payment_by_order(&self, order_id: u64) -> StoreResult<Option<Payment>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PAYMENTS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Cart Operations ==========

    pub fn cart_in(&self, txn: &WriteTransaction, user_id: u64) -> StoreResult<Vec<CartLine>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    pub fn put_cart_in(
        &self,
        txn: &WriteTransaction,
        user_id: u64,
        lines: &[CartLine],
    ) -> StoreResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        if lines.is_empty() {
            table.remove(user_id)?;
        } else {
            let bytes = serde_json::to_vec(lines)?;
            table.insert(user_id, bytes.as_slice())?;
        }
        Ok(())
    }

    pub fn cart(&self, user_id: u64) -> StoreResult<Vec<CartLine>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }
}
