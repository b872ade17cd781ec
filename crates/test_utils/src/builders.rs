//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::{DateTime, Utc};
use domain_debt::{LineItem, NewLineItem, Order};
use ledger_kernel::{CustomerId, Money, ProductId};

use crate::fixtures::money;

/// Builder for constructing test orders directly (bypassing the service)
pub struct TestOrderBuilder {
    customer_id: CustomerId,
    items: Vec<LineItem>,
    placed_at: Option<DateTime<Utc>>,
}

impl Default for TestOrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrderBuilder {
    /// Creates a builder with a fresh customer id and no items
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new(),
            items: Vec::new(),
            placed_at: None,
        }
    }

    /// Sets the owning customer
    pub fn for_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Appends a free-form line item, e.g. `.with_item("rice", 2, "10.00")`
    pub fn with_item(mut self, description: &str, quantity: u32, unit_price: &str) -> Self {
        self.items.push(
            LineItem::new(None, description, quantity, money(unit_price))
                .expect("valid test line item"),
        );
        self
    }

    /// Sets the purchase time
    pub fn placed_at(mut self, at: DateTime<Utc>) -> Self {
        self.placed_at = Some(at);
        self
    }

    /// Builds the order
    pub fn build(self) -> Order {
        let order = Order::new(self.customer_id, self.items);
        match self.placed_at {
            Some(at) => order.placed_at(at),
            None => order,
        }
    }
}

/// Builder for service-level line item requests
pub struct NewLineItemBuilder {
    product_id: Option<ProductId>,
    description: Option<String>,
    quantity: u32,
    unit_price: Option<Money>,
}

impl Default for NewLineItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewLineItemBuilder {
    pub fn new() -> Self {
        Self {
            product_id: None,
            description: None,
            quantity: 1,
            unit_price: None,
        }
    }

    /// References a catalog product, letting the service snapshot its price
    pub fn from_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn priced(mut self, unit_price: &str) -> Self {
        self.unit_price = Some(money(unit_price));
        self
    }

    pub fn build(self) -> NewLineItem {
        NewLineItem {
            product_id: self.product_id,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Shorthand for a one-line free-form item request
pub fn free_item(description: &str, quantity: u32, unit_price: &str) -> NewLineItem {
    NewLineItemBuilder::new()
        .describe(description)
        .quantity(quantity)
        .priced(unit_price)
        .build()
}
