//! Debt domain errors

use ledger_kernel::{CustomerId, MoneyError, OrderId};
use thiserror::Error;

use crate::ports::StoreError;

/// Errors that can occur in the debt ledger domain.
///
/// Every failure is reported to the caller as a typed variant; nothing is
/// swallowed or retried here. Retry policy for transient storage contention
/// belongs to the storage layer.
#[derive(Debug, Error)]
pub enum DebtError {
    /// Malformed or out-of-range monetary input, or arithmetic overflow.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Payment against a deleted, written-off, or otherwise non-payable order.
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    /// Edit attempted on an order whose line items are frozen.
    #[error("Order is frozen: {0}")]
    OrderFrozen(String),

    /// Operation attempted against a soft-deleted order.
    #[error("Order has been deleted: {0}")]
    OrderDeleted(OrderId),

    /// Customer deletion rejected while non-deleted orders remain.
    #[error("Customer {0} still has active orders")]
    AccountHasActiveOrders(CustomerId),

    /// An active product with the same name already exists.
    #[error("An active product named {0:?} already exists")]
    DuplicateProduct(String),

    /// Reference to a missing entity.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage collaborator failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<MoneyError> for DebtError {
    fn from(err: MoneyError) -> Self {
        DebtError::InvalidAmount(err.to_string())
    }
}

impl DebtError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DebtError::NotFound(what.into())
    }
}
