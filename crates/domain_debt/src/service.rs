//! Ledger service
//!
//! [`DebtLedger`] is the surface the presentation layer calls. It wires the
//! pure aggregate logic to the storage port, keeps the summary cache in step
//! with every mutation, and owns the cross-entity policies (customer
//! deletion, catalog name uniqueness, price snapshotting).
//!
//! Every order mutation follows one shape: load a consistent snapshot,
//! mutate the aggregate in memory, write it back through the store's
//! compare-and-swap, then fold the before/after delta into the summary
//! cache. A version conflict surfaces as a typed error; nothing is retried
//! here.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tracing::{info, instrument};

use ledger_kernel::{CustomerId, Money, OrderId, ProductId};

use crate::customer::{Customer, CustomerDetails};
use crate::error::DebtError;
use crate::order::{LineItem, LineItemOp, Order};
use crate::ports::LedgerStore;
use crate::product::Product;
use crate::status::OrderStatus;
use crate::summary::{SummaryCache, SummaryTotals};

/// Reference to any soft-deletable entity, for the uniform delete entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Customer(CustomerId),
    Product(ProductId),
    Order(OrderId),
}

/// Input for one line item when creating an order or quoting.
///
/// When `product_id` is set, a missing `unit_price` or `description` is
/// filled from the catalog at that moment — the snapshot. Without a product
/// reference both must be supplied.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_id: Option<ProductId>,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<Money>,
}

/// A priced preview line returned by [`DebtLedger::quote`].
#[derive(Debug, Clone)]
pub struct QuoteLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A price preview without persistence.
#[derive(Debug, Clone)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub total: Money,
}

/// The debt ledger engine.
pub struct DebtLedger<S> {
    store: S,
    summaries: RwLock<SummaryCache>,
}

impl<S: LedgerStore> DebtLedger<S> {
    /// Creates a ledger over the given store. Call [`DebtLedger::reconcile`]
    /// before serving summary reads so the cache reflects durable state.
    pub fn new(store: S) -> Self {
        Self {
            store,
            summaries: RwLock::new(SummaryCache::new()),
        }
    }

    /// Rebuilds the summary cache from a full scan of active orders.
    ///
    /// The incremental cache is never trusted across process restarts; this
    /// is the verification pass that re-grounds it.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<(), DebtError> {
        let orders = self.store.list_active_orders().await?;
        self.write_cache().rebuild(&orders);
        info!(orders = orders.len(), "summary cache rebuilt from full scan");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    /// Creates a customer record.
    pub async fn create_customer(&self, details: CustomerDetails) -> Result<Customer, DebtError> {
        let mut customer = Customer::new(details.name.clone());
        customer.real_name = details.real_name;
        customer.phone = details.phone;
        customer.location = details.location;
        customer.remarks = details.remarks;

        self.store.insert_customer(&customer).await?;
        info!(customer = %customer.id, "customer created");
        Ok(customer)
    }

    /// Updates a customer's identity fields.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        details: CustomerDetails,
    ) -> Result<Customer, DebtError> {
        let mut customer = self.fetch_customer(id).await?;
        if !customer.is_active() {
            return Err(DebtError::not_found(format!("customer {id}")));
        }
        customer.update_details(details, Utc::now());
        self.store.update_customer(&customer).await?;
        Ok(customer)
    }

    /// Fetches one customer, including soft-deleted ones (history).
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, DebtError> {
        self.fetch_customer(id).await
    }

    /// Lists active customers.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, DebtError> {
        Ok(self.store.list_active_customers().await?)
    }

    /// Soft-deletes a customer.
    ///
    /// Rejected while the customer still has non-deleted orders: a live
    /// financial obligation must not dangle under a deleted party. Callers
    /// soft-delete the orders first. Idempotent once the orders are gone.
    pub async fn soft_delete_customer(&self, id: CustomerId) -> Result<(), DebtError> {
        let mut customer = self.fetch_customer(id).await?;
        if customer.state.is_deleted() {
            return Ok(());
        }
        if self.store.customer_has_active_orders(id).await? {
            return Err(DebtError::AccountHasActiveOrders(id));
        }
        customer.soft_delete(Utc::now());
        self.store.update_customer(&customer).await?;
        info!(customer = %id, "customer soft-deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Adds a product to the catalog. Active product names are unique.
    pub async fn create_product(
        &self,
        name: String,
        unit_price: Money,
        purchase_price: Option<Money>,
    ) -> Result<Product, DebtError> {
        if unit_price.is_negative() {
            return Err(DebtError::InvalidAmount(format!(
                "unit price must not be negative, got {unit_price}"
            )));
        }
        if self
            .store
            .find_active_product_by_name(&name)
            .await?
            .is_some()
        {
            return Err(DebtError::DuplicateProduct(name));
        }
        let mut product = Product::new(name, unit_price);
        product.purchase_price = purchase_price;
        self.store.insert_product(&product).await?;
        info!(product = %product.id, "product created");
        Ok(product)
    }

    /// Re-prices a product. Existing order snapshots are untouched.
    pub async fn update_product(
        &self,
        id: ProductId,
        unit_price: Money,
        purchase_price: Option<Money>,
    ) -> Result<Product, DebtError> {
        if unit_price.is_negative() {
            return Err(DebtError::InvalidAmount(format!(
                "unit price must not be negative, got {unit_price}"
            )));
        }
        let mut product = self.fetch_product(id).await?;
        if !product.is_active() {
            return Err(DebtError::not_found(format!("product {id}")));
        }
        product.reprice(unit_price, Utc::now());
        product.purchase_price = purchase_price;
        self.store.update_product(&product).await?;
        Ok(product)
    }

    /// Fetches one product, including soft-deleted ones.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, DebtError> {
        self.fetch_product(id).await
    }

    /// Lists active catalog products.
    pub async fn list_products(&self) -> Result<Vec<Product>, DebtError> {
        Ok(self.store.list_active_products().await?)
    }

    /// Soft-deletes a product. Idempotent; order snapshots keep working.
    pub async fn soft_delete_product(&self, id: ProductId) -> Result<(), DebtError> {
        let mut product = self.fetch_product(id).await?;
        if product.state.is_deleted() {
            return Ok(());
        }
        product.soft_delete(Utc::now());
        self.store.update_product(&product).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Creates an order for a customer, snapshotting unit prices.
    #[instrument(skip(self, items))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        items: Vec<NewLineItem>,
    ) -> Result<Order, DebtError> {
        let customer = self.fetch_customer(customer_id).await?;
        if !customer.is_active() {
            return Err(DebtError::not_found(format!("customer {customer_id}")));
        }
        if items.is_empty() {
            return Err(DebtError::InvalidAmount(
                "an order requires at least one line item".into(),
            ));
        }

        let mut line_items = Vec::with_capacity(items.len());
        for item in items {
            line_items.push(self.resolve_line_item(item).await?);
        }

        let order = Order::new(customer_id, line_items);
        self.store.insert_order(&order).await?;
        self.write_cache().apply(None, &order);
        info!(order = %order.id, customer = %customer_id, total = %order.total(), "order created");
        Ok(order)
    }

    /// Applies a batch of line-item edits to an order.
    pub async fn edit_line_items(
        &self,
        order_id: OrderId,
        ops: Vec<LineItemOp>,
    ) -> Result<Order, DebtError> {
        self.mutate_order(order_id, |order| order.apply_ops(&ops, Utc::now()))
            .await
    }

    /// Records a payment against an order.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        amount: Money,
        note: Option<String>,
    ) -> Result<Order, DebtError> {
        self.mutate_order(order_id, |order| {
            order.record_payment(amount, note, Utc::now()).map(|_| ())
        })
        .await
    }

    /// Writes an order off as bad debt.
    pub async fn mark_defaulted(&self, order_id: OrderId) -> Result<Order, DebtError> {
        self.mutate_order(order_id, |order| order.mark_defaulted(Utc::now()))
            .await
    }

    /// Reverses a write-off.
    pub async fn reverse_default(&self, order_id: OrderId) -> Result<Order, DebtError> {
        self.mutate_order(order_id, |order| order.reverse_default(Utc::now()))
            .await
    }

    /// Soft-deletes an order. Idempotent.
    pub async fn soft_delete_order(&self, order_id: OrderId) -> Result<(), DebtError> {
        let order = self
            .store
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| DebtError::not_found(format!("order {order_id}")))?;
        if order.state.is_deleted() {
            return Ok(());
        }
        let before = order.clone();
        let mut order = order;
        order.soft_delete(Utc::now());
        self.store.update_order(&order).await?;
        self.write_cache().apply(Some(&before), &order);
        info!(order = %order_id, "order soft-deleted");
        Ok(())
    }

    /// Active orders system-wide, optionally filtered by status label.
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, DebtError> {
        let orders = match status {
            Some(status) => self.store.list_active_orders_by_status(status).await?,
            None => self.store.list_active_orders().await?,
        };
        Ok(orders)
    }

    /// Fetches one order, including soft-deleted ones (history).
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DebtError> {
        self.store
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| DebtError::not_found(format!("order {order_id}")))
    }

    /// Orders for a customer; history queries include soft-deleted rows.
    pub async fn customer_orders(
        &self,
        customer_id: CustomerId,
        include_deleted: bool,
    ) -> Result<Vec<Order>, DebtError> {
        self.fetch_customer(customer_id).await?;
        let orders = if include_deleted {
            self.store.list_orders_for_customer(customer_id).await?
        } else {
            self.store
                .list_active_orders_for_customer(customer_id)
                .await?
        };
        Ok(orders)
    }

    // ------------------------------------------------------------------
    // Soft delete, uniform entry point
    // ------------------------------------------------------------------

    /// Soft-deletes any entity by reference. Idempotent.
    pub async fn soft_delete(&self, entity: EntityRef) -> Result<(), DebtError> {
        match entity {
            EntityRef::Customer(id) => self.soft_delete_customer(id).await,
            EntityRef::Product(id) => self.soft_delete_product(id).await,
            EntityRef::Order(id) => self.soft_delete_order(id).await,
        }
    }

    // ------------------------------------------------------------------
    // Summaries
    // ------------------------------------------------------------------

    /// Rollup for one customer, served from the incremental cache.
    pub async fn account_summary(&self, customer_id: CustomerId) -> Result<SummaryTotals, DebtError> {
        self.fetch_customer(customer_id).await?;
        Ok(self.read_cache().customer(customer_id))
    }

    /// System-wide rollup, served from the incremental cache.
    pub fn system_summary(&self) -> SummaryTotals {
        self.read_cache().system()
    }

    // ------------------------------------------------------------------
    // Quoting
    // ------------------------------------------------------------------

    /// Prices a prospective set of line items without persisting anything.
    pub async fn quote(&self, items: Vec<NewLineItem>) -> Result<Quote, DebtError> {
        let mut lines = Vec::with_capacity(items.len());
        let mut total = Money::zero();
        for item in items {
            let resolved = self.resolve_line_item(item).await?;
            let line_total = resolved.line_total();
            total = total.checked_add(line_total)?;
            lines.push(QuoteLine {
                description: resolved.description,
                quantity: resolved.quantity,
                unit_price: resolved.unit_price,
                line_total,
            });
        }
        Ok(Quote { lines, total })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Load-mutate-store cycle with summary delta maintenance.
    async fn mutate_order<F>(&self, order_id: OrderId, mutate: F) -> Result<Order, DebtError>
    where
        F: FnOnce(&mut Order) -> Result<(), DebtError>,
    {
        let order = self
            .store
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| DebtError::not_found(format!("order {order_id}")))?;
        let before = order.clone();
        let mut order = order;
        mutate(&mut order)?;
        self.store.update_order(&order).await?;
        self.write_cache().apply(Some(&before), &order);
        Ok(order)
    }

    /// Resolves a line-item request against the catalog, taking the price
    /// snapshot at this moment.
    async fn resolve_line_item(&self, item: NewLineItem) -> Result<LineItem, DebtError> {
        let (description, unit_price) = match item.product_id {
            Some(product_id) => {
                let product = self.fetch_product(product_id).await?;
                if !product.is_active() {
                    return Err(DebtError::not_found(format!("product {product_id}")));
                }
                (
                    item.description.unwrap_or_else(|| product.name.clone()),
                    item.unit_price.unwrap_or(product.unit_price),
                )
            }
            None => {
                let description = item.description.ok_or_else(|| {
                    DebtError::InvalidAmount(
                        "a line item without a product requires a description".into(),
                    )
                })?;
                let unit_price = item.unit_price.ok_or_else(|| {
                    DebtError::InvalidAmount(
                        "a line item without a product requires a unit price".into(),
                    )
                })?;
                (description, unit_price)
            }
        };
        LineItem::new(item.product_id, description, item.quantity, unit_price)
    }

    async fn fetch_customer(&self, id: CustomerId) -> Result<Customer, DebtError> {
        self.store
            .fetch_customer(id)
            .await?
            .ok_or_else(|| DebtError::not_found(format!("customer {id}")))
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, DebtError> {
        self.store
            .fetch_product(id)
            .await?
            .ok_or_else(|| DebtError::not_found(format!("product {id}")))
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, SummaryCache> {
        self.summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, SummaryCache> {
        self.summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
