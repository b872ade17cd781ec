//! Ledger Kernel - Foundational types for the debt ledger
//!
//! This crate provides the building blocks shared by every layer of the
//! system:
//! - Money with exact decimal arithmetic at a fixed scale
//! - Strongly-typed entity identifiers
//! - Soft-delete lifecycle state

pub mod error;
pub mod identifiers;
pub mod lifecycle;
pub mod money;

pub use error::KernelError;
pub use identifiers::{CustomerId, LineItemId, OrderId, PaymentId, ProductId};
pub use lifecycle::EntityState;
pub use money::{Money, MoneyError};
