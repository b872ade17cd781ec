//! Storage port
//!
//! The ledger core owns its semantics but delegates durability to a storage
//! collaborator behind [`LedgerStore`]. Implementations must persist an
//! order together with its line items and payments atomically, and must
//! serialize concurrent writers per order: [`LedgerStore::update_order`]
//! compares the caller's `version` against the stored one and fails with
//! [`StoreError::Conflict`] if another writer got there first, so
//! recompute-and-store cycles never interleave partial updates.

use async_trait::async_trait;
use thiserror::Error;

use ledger_kernel::{CustomerId, OrderId, ProductId};

use crate::customer::Customer;
use crate::order::Order;
use crate::product::Product;
use crate::status::OrderStatus;

/// Storage collaborator failures.
///
/// Retry on transient contention is the implementation's business; the
/// domain never retries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found: {0}")]
    NotFound(String),

    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable persistence for customers, products, and orders.
///
/// Fetch methods return soft-deleted rows too (history queries); listing
/// methods are explicit about whether they filter to active rows. Writes of
/// an order replace the order row, its line items, and its payments in one
/// atomic scope.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // Customers
    async fn insert_customer(&self, customer: &Customer) -> Result<(), StoreError>;
    async fn update_customer(&self, customer: &Customer) -> Result<(), StoreError>;
    async fn fetch_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn list_active_customers(&self) -> Result<Vec<Customer>, StoreError>;

    // Products
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn list_active_products(&self) -> Result<Vec<Product>, StoreError>;
    /// Active product with the given name, for the uniqueness policy.
    async fn find_active_product_by_name(&self, name: &str)
        -> Result<Option<Product>, StoreError>;

    // Orders
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    /// Compare-and-swap write keyed on `Order::version`. The stored version
    /// is bumped on success; a mismatch fails with [`StoreError::Conflict`].
    async fn update_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Active orders for one customer, as one consistent snapshot.
    async fn list_active_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError>;
    /// All orders for one customer, including soft-deleted (history).
    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError>;
    /// All active orders system-wide, as one consistent snapshot.
    async fn list_active_orders(&self) -> Result<Vec<Order>, StoreError>;
    /// Active orders filtered by status label.
    async fn list_active_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, StoreError>;
    /// True if the customer has any non-deleted orders.
    async fn customer_has_active_orders(&self, customer_id: CustomerId)
        -> Result<bool, StoreError>;
}
