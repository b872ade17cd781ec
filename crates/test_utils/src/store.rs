//! In-Memory Ledger Store
//!
//! A [`LedgerStore`] over hash maps, for exercising the service layer
//! without a database. It enforces the same version compare-and-swap
//! contract as the PostgreSQL implementation, so conflict paths are
//! testable in-process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use domain_debt::{Customer, LedgerStore, Order, OrderStatus, Product, StoreError};
use ledger_kernel::{CustomerId, OrderId, ProductId};

#[derive(Debug, Default)]
struct Inner {
    customers: HashMap<CustomerId, Customer>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

/// In-memory [`LedgerStore`] implementation.
///
/// Clones share the same state, so a test can hand one handle to the
/// service and keep another for direct inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), StoreError> {
        self.lock().customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.customers.contains_key(&customer.id) {
            return Err(StoreError::NotFound(customer.id.to_string()));
        }
        inner.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn fetch_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.lock().customers.get(&id).cloned())
    }

    async fn list_active_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let mut customers: Vec<_> = self
            .lock()
            .customers
            .values()
            .filter(|c| c.state.is_active())
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.lock().products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.products.contains_key(&product.id) {
            return Err(StoreError::NotFound(product.id.to_string()));
        }
        inner.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn list_active_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<_> = self
            .lock()
            .products
            .values()
            .filter(|p| p.state.is_active())
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_active_product_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.state.is_active() && p.name == name)
            .cloned())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.lock().orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let stored = inner
            .orders
            .get(&order.id)
            .ok_or_else(|| StoreError::NotFound(order.id.to_string()))?;
        if stored.version != order.version {
            return Err(StoreError::Conflict(order.id.to_string()));
        }
        let mut updated = order.clone();
        updated.version += 1;
        inner.orders.insert(order.id, updated);
        Ok(())
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn list_active_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<_> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id && o.state.is_active())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<_> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    async fn list_active_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<_> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.state.is_active())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    async fn list_active_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<_> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.state.is_active() && o.status == status)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    async fn customer_has_active_orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .orders
            .values()
            .any(|o| o.customer_id == customer_id && o.state.is_active()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_debt::CustomerDetails;

    fn customer(name: &str) -> Customer {
        let mut c = Customer::new(name.to_string());
        c.update_details(
            CustomerDetails {
                name: name.to_string(),
                real_name: None,
                phone: None,
                location: None,
                remarks: None,
            },
            chrono::Utc::now(),
        );
        c
    }

    #[tokio::test]
    async fn test_update_order_rejects_stale_version() {
        let store = MemoryLedgerStore::new();
        let c = customer("a");
        store.insert_customer(&c).await.unwrap();

        let order = Order::new(
            c.id,
            vec![domain_debt::LineItem::new(
                None,
                "thing",
                1,
                ledger_kernel::Money::from_minor(1000),
            )
            .unwrap()],
        );
        store.insert_order(&order).await.unwrap();

        // First write succeeds and bumps the stored version.
        store.update_order(&order).await.unwrap();

        // A second write from the same stale snapshot must conflict.
        assert!(matches!(
            store.update_order(&order).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
