//! PostgreSQL implementation of the ledger storage port
//!
//! Orders are written atomically: the order row, its line items, and its
//! payments go through one transaction, so readers never observe a torn
//! line-item sum. Concurrent writers on the same order are serialized by a
//! compare-and-swap on the `version` column; the loser gets
//! [`StoreError::Conflict`]. Listing methods run their selects inside one
//! transaction so system-wide scans see a consistent snapshot.
//!
//! Queries are runtime-bound (`sqlx::query` / `query_as`) rather than the
//! compile-time checked macros, so the workspace builds without a live
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use domain_debt::{
    Customer, LedgerStore, LineItem, Order, OrderStatus, PaymentRecord, Product, StoreError,
};
use ledger_kernel::{CustomerId, EntityState, Money, OrderId, ProductId};

use crate::error::backend;

/// [`LedgerStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Creates a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn state_from(deleted_at: Option<DateTime<Utc>>) -> EntityState {
    match deleted_at {
        None => EntityState::Active,
        Some(deleted_at) => EntityState::Deleted { deleted_at },
    }
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Paid => "paid",
        OrderStatus::Defaulted => "defaulted",
    }
}

fn status_from_str(status: &str) -> Result<OrderStatus, StoreError> {
    match status {
        "pending" => Ok(OrderStatus::Pending),
        "paid" => Ok(OrderStatus::Paid),
        "defaulted" => Ok(OrderStatus::Defaulted),
        other => Err(StoreError::Backend(format!(
            "unknown status label in database: {other}"
        ))),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: Uuid,
    name: String,
    real_name: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    remarks: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::from(row.customer_id),
            name: row.name,
            real_name: row.real_name,
            phone: row.phone,
            location: row.location,
            remarks: row.remarks,
            state: state_from(row.deleted_at),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    name: String,
    unit_price: Decimal,
    purchase_price: Option<Decimal>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from(row.product_id),
            name: row.name,
            unit_price: Money::new(row.unit_price),
            purchase_price: row.purchase_price.map(Money::new),
            state: state_from(row.deleted_at),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    customer_id: Uuid,
    placed_at: DateTime<Utc>,
    amount_paid: Decimal,
    written_off: bool,
    status: String,
    version: i64,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_id: Uuid,
    order_id: Uuid,
    product_id: Option<Uuid>,
    description: String,
    quantity: i32,
    unit_price: Decimal,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    payment_id: Uuid,
    order_id: Uuid,
    amount: Decimal,
    recorded_at: DateTime<Utc>,
    note: Option<String>,
}

fn hydrate_order(
    row: OrderRow,
    items: Vec<ItemRow>,
    payments: Vec<PaymentRow>,
) -> Result<Order, StoreError> {
    let line_items = items
        .into_iter()
        .map(|item| {
            let quantity = u32::try_from(item.quantity).map_err(|_| {
                StoreError::Backend(format!("negative quantity for item {}", item.item_id))
            })?;
            Ok(LineItem {
                id: item.item_id.into(),
                product_id: item.product_id.map(Into::into),
                description: item.description,
                quantity,
                unit_price: Money::new(item.unit_price),
                state: state_from(item.deleted_at),
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    let payments = payments
        .into_iter()
        .map(|p| PaymentRecord {
            id: p.payment_id.into(),
            amount: Money::new(p.amount),
            recorded_at: p.recorded_at,
            note: p.note,
        })
        .collect();

    Ok(Order {
        id: OrderId::from(row.order_id),
        customer_id: CustomerId::from(row.customer_id),
        placed_at: row.placed_at,
        state: state_from(row.deleted_at),
        line_items,
        payments,
        amount_paid: Money::new(row.amount_paid),
        written_off: row.written_off,
        status: status_from_str(&row.status)?,
        version: row.version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl PgLedgerStore {
    /// Writes an order's children inside the given transaction.
    ///
    /// Soft-deleted line items are persisted with their `deleted_at` set;
    /// the aggregate carries its full history, so rewriting the child rows
    /// loses nothing.
    async fn write_children(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(*order.id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(backend)?;
        for item in &order.line_items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    item_id, order_id, product_id, description,
                    quantity, unit_price, deleted_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(*item.id.as_uuid())
            .bind(*order.id.as_uuid())
            .bind(item.product_id.map(|id| *id.as_uuid()))
            .bind(&item.description)
            .bind(item.quantity as i32)
            .bind(item.unit_price.amount())
            .bind(item.state.deleted_at())
            .execute(&mut **tx)
            .await
            .map_err(backend)?;
        }

        sqlx::query("DELETE FROM payments WHERE order_id = $1")
            .bind(*order.id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(backend)?;
        for payment in &order.payments {
            sqlx::query(
                r#"
                INSERT INTO payments (payment_id, order_id, amount, recorded_at, note)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(*payment.id.as_uuid())
            .bind(*order.id.as_uuid())
            .bind(payment.amount.amount())
            .bind(payment.recorded_at)
            .bind(&payment.note)
            .execute(&mut **tx)
            .await
            .map_err(backend)?;
        }
        Ok(())
    }

    /// Opens a read transaction pinned to a single snapshot.
    ///
    /// Order rows and their children are read by separate statements; under
    /// the default READ COMMITTED level a concurrent commit between those
    /// statements could pair an order row with newer children. REPEATABLE
    /// READ makes both selects see the same snapshot.
    async fn begin_snapshot(&self) -> Result<Transaction<'_, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        Ok(tx)
    }

    /// Loads the orders matching `where_clause` together with their
    /// children, all within one transaction snapshot.
    async fn load_orders(
        &self,
        where_clause: &str,
        bind_uuid: Option<Uuid>,
        bind_status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, StoreError> {
        let mut tx = self.begin_snapshot().await?;

        let sql = format!(
            "SELECT order_id, customer_id, placed_at, amount_paid, written_off, \
             status, version, deleted_at, created_at, updated_at \
             FROM orders WHERE {where_clause} ORDER BY placed_at DESC"
        );
        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        if let Some(uuid) = bind_uuid {
            query = query.bind(uuid);
        }
        if let Some(status) = bind_status {
            query = query.bind(status_to_str(status));
        }
        let rows = query.fetch_all(&mut *tx).await.map_err(backend)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.order_id).collect();
        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT item_id, order_id, product_id, description, quantity, unit_price, deleted_at \
             FROM order_items WHERE order_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;
        let payments = sqlx::query_as::<_, PaymentRow>(
            "SELECT payment_id, order_id, amount, recorded_at, note \
             FROM payments WHERE order_id = ANY($1) ORDER BY recorded_at",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        let mut items_by_order: HashMap<Uuid, Vec<ItemRow>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        let mut payments_by_order: HashMap<Uuid, Vec<PaymentRow>> = HashMap::new();
        for payment in payments {
            payments_by_order
                .entry(payment.order_id)
                .or_default()
                .push(payment);
        }

        rows.into_iter()
            .map(|row| {
                let order_id = row.order_id;
                hydrate_order(
                    row,
                    items_by_order.remove(&order_id).unwrap_or_default(),
                    payments_by_order.remove(&order_id).unwrap_or_default(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert_customer(&self, customer: &Customer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id, name, real_name, phone, location, remarks,
                deleted_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.real_name)
        .bind(&customer.phone)
        .bind(&customer.location)
        .bind(&customer.remarks)
        .bind(customer.state.deleted_at())
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, real_name = $3, phone = $4, location = $5,
                remarks = $6, deleted_at = $7, updated_at = $8
            WHERE customer_id = $1
            "#,
        )
        .bind(*customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.real_name)
        .bind(&customer.phone)
        .bind(&customer.location)
        .bind(&customer.remarks)
        .bind(customer.state.deleted_at())
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(customer.id.to_string()));
        }
        Ok(())
    }

    async fn fetch_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT customer_id, name, real_name, phone, location, remarks, \
             deleted_at, created_at, updated_at FROM customers WHERE customer_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Customer::from))
    }

    async fn list_active_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT customer_id, name, real_name, phone, location, remarks, \
             deleted_at, created_at, updated_at \
             FROM customers WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, name, unit_price, purchase_price,
                deleted_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(&product.name)
        .bind(product.unit_price.amount())
        .bind(product.purchase_price.map(|p| p.amount()))
        .bind(product.state.deleted_at())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, unit_price = $3, purchase_price = $4,
                deleted_at = $5, updated_at = $6
            WHERE product_id = $1
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(&product.name)
        .bind(product.unit_price.amount())
        .bind(product.purchase_price.map(|p| p.amount()))
        .bind(product.state.deleted_at())
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(product.id.to_string()));
        }
        Ok(())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT product_id, name, unit_price, purchase_price, deleted_at, \
             created_at, updated_at FROM products WHERE product_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Product::from))
    }

    async fn list_active_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT product_id, name, unit_price, purchase_price, deleted_at, \
             created_at, updated_at \
             FROM products WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_active_product_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT product_id, name, unit_price, purchase_price, deleted_at, \
             created_at, updated_at \
             FROM products WHERE name = $1 AND deleted_at IS NULL",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Product::from))
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, customer_id, placed_at, amount_paid, written_off,
                status, version, deleted_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(*order.customer_id.as_uuid())
        .bind(order.placed_at)
        .bind(order.amount_paid.amount())
        .bind(order.written_off)
        .bind(status_to_str(order.status))
        .bind(order.version)
        .bind(order.state.deleted_at())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        Self::write_children(&mut tx, order).await?;
        tx.commit().await.map_err(backend)?;
        debug!(order = %order.id, "order inserted");
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Compare-and-swap on the version column serializes concurrent
        // writers per order.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET amount_paid = $3, written_off = $4, status = $5,
                deleted_at = $6, updated_at = $7, version = version + 1
            WHERE order_id = $1 AND version = $2
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(order.version)
        .bind(order.amount_paid.amount())
        .bind(order.written_off)
        .bind(status_to_str(order.status))
        .bind(order.state.deleted_at())
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM orders WHERE order_id = $1")
                .bind(*order.id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
            return Err(match exists {
                Some(_) => StoreError::Conflict(order.id.to_string()),
                None => StoreError::NotFound(order.id.to_string()),
            });
        }

        Self::write_children(&mut tx, order).await?;
        tx.commit().await.map_err(backend)?;
        debug!(order = %order.id, version = order.version + 1, "order updated");
        Ok(())
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut tx = self.begin_snapshot().await?;
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT order_id, customer_id, placed_at, amount_paid, written_off, \
             status, version, deleted_at, created_at, updated_at \
             FROM orders WHERE order_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            tx.commit().await.map_err(backend)?;
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT item_id, order_id, product_id, description, quantity, unit_price, deleted_at \
             FROM order_items WHERE order_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;
        let payments = sqlx::query_as::<_, PaymentRow>(
            "SELECT payment_id, order_id, amount, recorded_at, note \
             FROM payments WHERE order_id = $1 ORDER BY recorded_at",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;
        tx.commit().await.map_err(backend)?;

        hydrate_order(row, items, payments).map(Some)
    }

    async fn list_active_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError> {
        self.load_orders(
            "customer_id = $1 AND deleted_at IS NULL",
            Some(*customer_id.as_uuid()),
            None,
        )
        .await
    }

    async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, StoreError> {
        self.load_orders("customer_id = $1", Some(*customer_id.as_uuid()), None)
            .await
    }

    async fn list_active_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.load_orders("deleted_at IS NULL", None, None).await
    }

    async fn list_active_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, StoreError> {
        self.load_orders("status = $1 AND deleted_at IS NULL", None, Some(status))
            .await
    }

    async fn customer_has_active_orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<bool, StoreError> {
        let row =
            sqlx::query("SELECT 1 FROM orders WHERE customer_id = $1 AND deleted_at IS NULL LIMIT 1")
                .bind(*customer_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Defaulted,
        ] {
            assert_eq!(status_from_str(status_to_str(status)).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(matches!(
            status_from_str("unknown"),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn test_state_from_deleted_at() {
        assert!(state_from(None).is_active());
        let now = Utc::now();
        assert_eq!(state_from(Some(now)).deleted_at(), Some(now));
    }
}
