//! Order status classification
//!
//! The status of an order is derived from its payment facts, never set by
//! hand. The persisted label exists for query efficiency and is kept
//! consistent by re-running [`classify`] on every mutation.

use ledger_kernel::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repayment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Amount paid has not yet covered the order total.
    Pending,
    /// Amount paid covers the order total.
    Paid,
    /// Explicitly written off as uncollectable.
    Defaulted,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Defaulted => "defaulted",
        };
        f.write_str(label)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "defaulted" => Ok(OrderStatus::Defaulted),
            other => Err(format!("unknown status label: {other}")),
        }
    }
}

/// Derives the status label from the triggering facts.
///
/// A write-off always wins: it is recorded only by an explicit manual action
/// and is cleared only by an explicit reversal, never by elapsed time or by
/// further payments. Absent a write-off, `Paid` and `Pending` partition the
/// space exactly: paid iff `amount_paid >= total`.
///
/// A zero-total order with nothing paid classifies as `Paid` (there is
/// nothing owed), which keeps the pending aggregate free of empty orders.
pub fn classify(total: Money, amount_paid: Money, written_off: bool) -> OrderStatus {
    if written_off {
        OrderStatus::Defaulted
    } else if amount_paid >= total {
        OrderStatus::Paid
    } else {
        OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    #[test]
    fn test_new_order_is_pending() {
        assert_eq!(
            classify(money(2500), Money::zero(), false),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_paid_at_exact_total() {
        assert_eq!(
            classify(money(2500), money(2500), false),
            OrderStatus::Paid
        );
    }

    #[test]
    fn test_partial_payment_stays_pending() {
        assert_eq!(
            classify(money(2500), money(2499), false),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_write_off_wins_over_payment_state() {
        assert_eq!(
            classify(money(2500), money(2500), true),
            OrderStatus::Defaulted
        );
        assert_eq!(classify(money(2500), money(0), true), OrderStatus::Defaulted);
    }

    #[test]
    fn test_edit_reducing_total_below_paid_reclassifies() {
        // A later edit that drops the total below amount_paid flips the
        // label back to Paid on recompute rather than leaving it stale.
        assert_eq!(
            classify(money(2000), money(2500), false),
            OrderStatus::Paid
        );
    }

    #[test]
    fn test_zero_total_zero_paid_is_paid() {
        assert_eq!(
            classify(Money::zero(), Money::zero(), false),
            OrderStatus::Paid
        );
    }
}
