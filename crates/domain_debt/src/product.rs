//! Product catalog
//!
//! Products carry the CURRENT unit price used when a line item is created
//! without an explicit price. Line items snapshot the price at creation, so
//! catalog edits never touch existing orders. Active product names are
//! unique; soft-deleted products may share a name with a newly created one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledger_kernel::{EntityState, Money, ProductId};

/// A priced good or service in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Product name (unique among active products)
    pub name: String,
    /// Current selling unit price
    pub unit_price: Money,
    /// Purchase/cost price, if tracked
    pub purchase_price: Option<Money>,
    /// Soft-delete state
    pub state: EntityState,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new active product.
    pub fn new(name: impl Into<String>, unit_price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new_v7(),
            name: name.into(),
            unit_price,
            purchase_price: None,
            state: EntityState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the purchase price
    pub fn with_purchase_price(mut self, purchase_price: Money) -> Self {
        self.purchase_price = Some(purchase_price);
        self
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Re-prices the product. Existing line-item snapshots are unaffected.
    pub fn reprice(&mut self, unit_price: Money, now: DateTime<Utc>) {
        self.unit_price = unit_price;
        self.updated_at = now;
    }

    /// Soft-deletes the product. Idempotent. Line items that reference it
    /// keep their snapshots and remain valid.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.state.soft_delete(now);
        self.updated_at = now;
    }
}
