//! Debt Domain - Customer Debt Ledger
//!
//! This crate implements the ledger engine for tracking debts between a
//! business and its customers: who owes what, what has been paid, and what
//! has been written off.
//!
//! # Model
//!
//! - A **Customer** owns zero or more **Orders**
//! - An **Order** aggregates **LineItems** (frozen unit-price snapshots)
//!   and payments, and carries a derived status label
//! - Status is one of `pending`, `paid`, `defaulted`, re-derived by the
//!   classifier on every mutation
//! - Everything is soft-deleted, never physically removed; active
//!   aggregates filter on [`ledger_kernel::EntityState`]
//! - The **summary aggregator** folds active orders into per-customer and
//!   system-wide totals (billed, pending, collected, defaulted)
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_debt::{DebtLedger, CustomerDetails, NewLineItem};
//!
//! let ledger = DebtLedger::new(store);
//! let customer = ledger.create_customer(details).await?;
//! let order = ledger.create_order(customer.id, items).await?;
//! ledger.record_payment(order.id, amount, None).await?;
//! let totals = ledger.system_summary();
//! ```

pub mod customer;
pub mod error;
pub mod order;
pub mod ports;
pub mod product;
pub mod service;
pub mod status;
pub mod summary;

pub use customer::{Customer, CustomerDetails};
pub use error::DebtError;
pub use order::{LineItem, LineItemOp, Order, PaymentRecord};
pub use ports::{LedgerStore, StoreError};
pub use product::Product;
pub use service::{DebtLedger, EntityRef, NewLineItem, Quote, QuoteLine};
pub use status::{classify, OrderStatus};
pub use summary::{compute_totals, SummaryCache, SummaryTotals};
