//! Order aggregate
//!
//! An order belongs to one customer and aggregates line items plus payments.
//! Line items carry a unit-price snapshot frozen at creation; later catalog
//! re-pricing never reaches back into an order. The order total is always
//! the sum of ACTIVE line items; soft-deleted items are excluded from the
//! sum but retained for audit.
//!
//! # Invariants
//!
//! - `amount_paid <= total()` except under an explicit write-off, where the
//!   shortfall is the defaulted amount
//! - `amount_paid` is monotonically non-decreasing
//! - the persisted status label is re-derived by the classifier on every
//!   mutation, never hand-set
//! - soft deletion is idempotent and never reversed into a hard delete
//!
//! All mutations go through the methods below; they validate, recompute the
//! total, and re-run the classifier so the label can never go stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ledger_kernel::{CustomerId, EntityState, LineItemId, Money, OrderId, PaymentId, ProductId};

use crate::error::DebtError;
use crate::status::{classify, OrderStatus};

/// One priced unit inside an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier
    pub id: LineItemId,
    /// Catalog product this snapshot was taken from, if any
    pub product_id: Option<ProductId>,
    /// Description of the good or service
    pub description: String,
    /// Quantity (always positive)
    pub quantity: u32,
    /// Unit-price snapshot captured at creation, never recomputed
    pub unit_price: Money,
    /// Soft-delete state
    pub state: EntityState,
}

impl LineItem {
    /// Creates a new line item, validating quantity and price.
    pub fn new(
        product_id: Option<ProductId>,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, DebtError> {
        if quantity == 0 {
            return Err(DebtError::InvalidAmount(
                "line item quantity must be positive".into(),
            ));
        }
        if unit_price.is_negative() {
            return Err(DebtError::InvalidAmount(format!(
                "unit price must not be negative, got {unit_price}"
            )));
        }
        // Overflow is rejected up front so line_total never has to fail.
        unit_price.multiply(quantity)?;
        Ok(Self {
            id: LineItemId::new_v7(),
            product_id,
            description: description.into(),
            quantity,
            unit_price,
            state: EntityState::Active,
        })
    }

    /// `quantity × unit_price`.
    pub fn line_total(&self) -> Money {
        // Construction and every edit validate the product, so this
        // cannot overflow on a live item.
        self.unit_price
            .multiply(self.quantity)
            .unwrap_or_else(|_| Money::zero())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// An edit operation against an order's line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LineItemOp {
    /// Appends a new line item with a fresh price snapshot.
    Add {
        product_id: Option<ProductId>,
        description: String,
        quantity: u32,
        unit_price: Money,
    },
    /// Changes quantity and/or re-snapshots the unit price of an item.
    Update {
        item_id: LineItemId,
        quantity: Option<u32>,
        unit_price: Option<Money>,
    },
    /// Soft-deletes an item. Removing an already-removed item is a no-op.
    Remove { item_id: LineItemId },
}

/// One recorded payment against an order, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub amount: Money,
    pub recorded_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// A billable transaction owned by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// When the purchase took place
    pub placed_at: DateTime<Utc>,
    /// Soft-delete state
    pub state: EntityState,
    /// Line items, including soft-deleted ones (audit history)
    pub line_items: Vec<LineItem>,
    /// Payment history
    pub payments: Vec<PaymentRecord>,
    /// Total paid to date; monotonically non-decreasing
    pub amount_paid: Money,
    /// Explicit write-off flag; the sole trigger for `Defaulted`
    pub written_off: bool,
    /// Persisted status label, kept consistent by the classifier
    pub status: OrderStatus,
    /// Optimistic-concurrency version, bumped by the store on each write
    pub version: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order for a customer with its initial line items.
    pub fn new(customer_id: CustomerId, line_items: Vec<LineItem>) -> Self {
        let now = Utc::now();
        let mut order = Self {
            id: OrderId::new_v7(),
            customer_id,
            placed_at: now,
            state: EntityState::Active,
            line_items,
            payments: Vec::new(),
            amount_paid: Money::zero(),
            written_off: false,
            status: OrderStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        order.reclassify();
        order
    }

    /// Sets the purchase time (defaults to creation time).
    pub fn placed_at(mut self, placed_at: DateTime<Utc>) -> Self {
        self.placed_at = placed_at;
        self
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Active (non-deleted) line items.
    pub fn active_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|item| item.is_active())
    }

    /// Recomputes the order total from active line items.
    pub fn total(&self) -> Money {
        self.active_items().map(LineItem::line_total).sum()
    }

    /// Unpaid remainder, floored at zero.
    pub fn outstanding(&self) -> Money {
        self.total().saturating_sub(self.amount_paid)
    }

    /// Applies a batch of line-item edits atomically.
    ///
    /// The whole batch is validated against a working copy first, so a
    /// failing op never leaves the order half-edited. Edits are rejected
    /// when the order is soft-deleted, settled (paid), or written off,
    /// and when the resulting total would drop below `amount_paid` (a
    /// recorded payment freezes the floor of the order total).
    pub fn apply_ops(&mut self, ops: &[LineItemOp], now: DateTime<Utc>) -> Result<(), DebtError> {
        if self.state.is_deleted() {
            return Err(DebtError::OrderDeleted(self.id));
        }
        if self.written_off {
            return Err(DebtError::OrderFrozen(format!(
                "order {} is written off; line items are frozen",
                self.id
            )));
        }
        if self.status == OrderStatus::Paid {
            return Err(DebtError::OrderFrozen(format!(
                "order {} is settled; line items are frozen",
                self.id
            )));
        }

        let mut items = self.line_items.clone();
        for op in ops {
            match op {
                LineItemOp::Add {
                    product_id,
                    description,
                    quantity,
                    unit_price,
                } => {
                    items.push(LineItem::new(
                        *product_id,
                        description.clone(),
                        *quantity,
                        *unit_price,
                    )?);
                }
                LineItemOp::Update {
                    item_id,
                    quantity,
                    unit_price,
                } => {
                    let item = items
                        .iter_mut()
                        .find(|item| item.id == *item_id && item.is_active())
                        .ok_or_else(|| DebtError::not_found(format!("line item {item_id}")))?;
                    if let Some(quantity) = quantity {
                        if *quantity == 0 {
                            return Err(DebtError::InvalidAmount(
                                "line item quantity must be positive".into(),
                            ));
                        }
                        item.quantity = *quantity;
                    }
                    if let Some(unit_price) = unit_price {
                        if unit_price.is_negative() {
                            return Err(DebtError::InvalidAmount(format!(
                                "unit price must not be negative, got {unit_price}"
                            )));
                        }
                        item.unit_price = *unit_price;
                    }
                    item.unit_price.multiply(item.quantity)?;
                }
                LineItemOp::Remove { item_id } => {
                    let item = items
                        .iter_mut()
                        .find(|item| item.id == *item_id)
                        .ok_or_else(|| DebtError::not_found(format!("line item {item_id}")))?;
                    item.state.soft_delete(now);
                }
            }
        }

        let new_total: Money = items
            .iter()
            .filter(|item| item.is_active())
            .map(LineItem::line_total)
            .sum();
        if new_total < self.amount_paid {
            return Err(DebtError::OrderFrozen(format!(
                "edit would reduce order {} total to {new_total}, below the {} already paid",
                self.id, self.amount_paid
            )));
        }

        self.line_items = items;
        self.updated_at = now;
        self.reclassify();
        Ok(())
    }

    /// Records a payment against the order.
    ///
    /// The amount must be strictly positive and must not push `amount_paid`
    /// past the order total. Payments against soft-deleted orders are
    /// rejected to preserve the audit boundary; payments against written-off
    /// orders are rejected until the default is explicitly reversed.
    pub fn record_payment(
        &mut self,
        amount: Money,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<PaymentId, DebtError> {
        if self.state.is_deleted() {
            return Err(DebtError::OrderDeleted(self.id));
        }
        if self.written_off {
            return Err(DebtError::InvalidPayment(format!(
                "order {} is written off; reverse the default before recording payments",
                self.id
            )));
        }
        if !amount.is_positive() {
            return Err(DebtError::InvalidPayment(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        let new_paid = self.amount_paid.checked_add(amount)?;
        if new_paid > self.total() {
            return Err(DebtError::InvalidPayment(format!(
                "payment of {amount} would exceed the outstanding balance of {}",
                self.outstanding()
            )));
        }

        let payment = PaymentRecord {
            id: PaymentId::new_v7(),
            amount,
            recorded_at: now,
            note,
        };
        let payment_id = payment.id;
        self.payments.push(payment);
        self.amount_paid = new_paid;
        self.updated_at = now;
        self.reclassify();

        debug!(order = %self.id, %amount, status = %self.status, "payment recorded");
        Ok(payment_id)
    }

    /// Writes the order off as uncollectable.
    ///
    /// This is the sole trigger for `Defaulted`; nothing in the core
    /// defaults an order from elapsed time. Idempotent.
    pub fn mark_defaulted(&mut self, now: DateTime<Utc>) -> Result<(), DebtError> {
        if self.state.is_deleted() {
            return Err(DebtError::OrderDeleted(self.id));
        }
        if !self.written_off {
            self.written_off = true;
            self.updated_at = now;
            self.reclassify();
        }
        Ok(())
    }

    /// Reverses a write-off, re-running the classifier on the underlying
    /// facts. Reversing a non-defaulted order is a no-op.
    pub fn reverse_default(&mut self, now: DateTime<Utc>) -> Result<(), DebtError> {
        if self.state.is_deleted() {
            return Err(DebtError::OrderDeleted(self.id));
        }
        if self.written_off {
            self.written_off = false;
            self.updated_at = now;
            self.reclassify();
        }
        Ok(())
    }

    /// Soft-deletes the order. Idempotent. Line items and payment history
    /// remain queryable; all active aggregates exclude the order.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.state.soft_delete(now);
        self.updated_at = now;
    }

    /// Re-derives the persisted status label from the current facts.
    fn reclassify(&mut self) {
        self.status = classify(self.total(), self.amount_paid, self.written_off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn item(description: &str, quantity: u32, price: &str) -> LineItem {
        LineItem::new(None, description, quantity, money(price)).unwrap()
    }

    /// Order with two items: qty 2 @ 10.00 and qty 1 @ 5.00 (total 25.00).
    fn sample_order() -> Order {
        Order::new(
            CustomerId::new(),
            vec![item("rice", 2, "10.00"), item("oil", 1, "5.00")],
        )
    }

    #[test]
    fn test_new_order_total_and_status() {
        let order = sample_order();
        assert_eq!(order.total(), money("25.00"));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_line_item_rejects_zero_quantity() {
        assert!(matches!(
            LineItem::new(None, "x", 0, money("1.00")),
            Err(DebtError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_line_item_rejects_overflowing_total() {
        // Near the decimal ceiling, quantity 2 overflows the product. The
        // item must be rejected outright, not priced at zero.
        let huge = money("79228162514264337593543950335");
        assert!(matches!(
            LineItem::new(None, "bulk", 2, huge),
            Err(DebtError::InvalidAmount(_))
        ));

        // The same guard applies when an edit pushes an existing item over.
        let mut order = sample_order();
        let rice_id = order.line_items[0].id;
        let result = order.apply_ops(
            &[LineItemOp::Update {
                item_id: rice_id,
                quantity: None,
                unit_price: Some(huge),
            }],
            Utc::now(),
        );
        assert!(matches!(result, Err(DebtError::InvalidAmount(_))));
        assert_eq!(order.total(), money("25.00"));
    }

    #[test]
    fn test_full_payment_flips_to_paid() {
        let mut order = sample_order();
        order.record_payment(money("25.00"), None, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.outstanding(), Money::zero());
    }

    #[test]
    fn test_partial_payment_stays_pending() {
        let mut order = sample_order();
        order.record_payment(money("10.00"), None, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.outstanding(), money("15.00"));
        assert_eq!(order.payments.len(), 1);
    }

    #[test]
    fn test_payment_must_be_positive() {
        let mut order = sample_order();
        assert!(matches!(
            order.record_payment(Money::zero(), None, Utc::now()),
            Err(DebtError::InvalidPayment(_))
        ));
        assert!(matches!(
            order.record_payment(money("-1.00"), None, Utc::now()),
            Err(DebtError::InvalidPayment(_))
        ));
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut order = sample_order();
        assert!(matches!(
            order.record_payment(money("25.01"), None, Utc::now()),
            Err(DebtError::InvalidPayment(_))
        ));
        assert_eq!(order.amount_paid, Money::zero());
    }

    #[test]
    fn test_payment_against_deleted_order_rejected() {
        let mut order = sample_order();
        order.soft_delete(Utc::now());
        assert!(matches!(
            order.record_payment(money("5.00"), None, Utc::now()),
            Err(DebtError::OrderDeleted(_))
        ));
    }

    #[test]
    fn test_removing_item_recomputes_total() {
        let mut order = sample_order();
        let oil_id = order.line_items[1].id;
        order
            .apply_ops(&[LineItemOp::Remove { item_id: oil_id }], Utc::now())
            .unwrap();

        assert_eq!(order.total(), money("20.00"));
        // The removed item is retained for audit.
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.active_items().count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut order = sample_order();
        let oil_id = order.line_items[1].id;
        let ops = [LineItemOp::Remove { item_id: oil_id }];
        order.apply_ops(&ops, Utc::now()).unwrap();
        order.apply_ops(&ops, Utc::now()).unwrap();
        assert_eq!(order.total(), money("20.00"));
    }

    #[test]
    fn test_edit_below_amount_paid_rejected() {
        // With 22.00 paid, soft-deleting the 5.00 item would leave
        // total 20.00 < paid 22.00 and must be rejected.
        let mut order = sample_order();
        order.record_payment(money("22.00"), None, Utc::now()).unwrap();
        let oil_id = order.line_items[1].id;

        let result = order.apply_ops(&[LineItemOp::Remove { item_id: oil_id }], Utc::now());
        assert!(matches!(result, Err(DebtError::OrderFrozen(_))));
        assert_eq!(order.total(), money("25.00"));
    }

    #[test]
    fn test_settled_order_is_frozen() {
        let mut order = sample_order();
        order.record_payment(money("25.00"), None, Utc::now()).unwrap();

        let result = order.apply_ops(
            &[LineItemOp::Add {
                product_id: None,
                description: "extra".into(),
                quantity: 1,
                unit_price: money("1.00"),
            }],
            Utc::now(),
        );
        assert!(matches!(result, Err(DebtError::OrderFrozen(_))));
    }

    #[test]
    fn test_failed_batch_leaves_order_untouched() {
        let mut order = sample_order();
        let rice_id = order.line_items[0].id;
        let result = order.apply_ops(
            &[
                LineItemOp::Update {
                    item_id: rice_id,
                    quantity: Some(5),
                    unit_price: None,
                },
                LineItemOp::Update {
                    item_id: LineItemId::new(),
                    quantity: Some(1),
                    unit_price: None,
                },
            ],
            Utc::now(),
        );

        assert!(matches!(result, Err(DebtError::NotFound(_))));
        // The first op of the failing batch must not have been applied.
        assert_eq!(order.line_items[0].quantity, 2);
    }

    #[test]
    fn test_edits_frozen_once_defaulted() {
        let mut order = sample_order();
        order.mark_defaulted(Utc::now()).unwrap();

        let result = order.apply_ops(
            &[LineItemOp::Add {
                product_id: None,
                description: "salt".into(),
                quantity: 1,
                unit_price: money("2.00"),
            }],
            Utc::now(),
        );
        assert!(matches!(result, Err(DebtError::OrderFrozen(_))));
    }

    #[test]
    fn test_payment_rejected_while_defaulted() {
        let mut order = sample_order();
        order.record_payment(money("10.00"), None, Utc::now()).unwrap();
        order.mark_defaulted(Utc::now()).unwrap();

        assert!(matches!(
            order.record_payment(money("15.00"), None, Utc::now()),
            Err(DebtError::InvalidPayment(_))
        ));
    }

    #[test]
    fn test_default_and_reverse_rerun_classifier() {
        let mut order = sample_order();
        order.record_payment(money("10.00"), None, Utc::now()).unwrap();
        order.mark_defaulted(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Defaulted);
        assert_eq!(order.outstanding(), money("15.00"));

        order.reverse_default(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        order.record_payment(money("15.00"), None, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn test_default_and_reverse_are_idempotent() {
        let mut order = sample_order();
        order.mark_defaulted(Utc::now()).unwrap();
        order.mark_defaulted(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Defaulted);

        order.reverse_default(Utc::now()).unwrap();
        order.reverse_default(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut order = sample_order();
        let first = Utc::now();
        order.soft_delete(first);
        order.soft_delete(first + chrono::Duration::hours(2));
        assert_eq!(order.state.deleted_at(), Some(first));
    }

    #[test]
    fn test_price_snapshot_survives_quantity_update() {
        let mut order = sample_order();
        let rice_id = order.line_items[0].id;
        order
            .apply_ops(
                &[LineItemOp::Update {
                    item_id: rice_id,
                    quantity: Some(3),
                    unit_price: None,
                }],
                Utc::now(),
            )
            .unwrap();

        assert_eq!(order.line_items[0].unit_price, money("10.00"));
        assert_eq!(order.total(), money("35.00"));
    }
}
