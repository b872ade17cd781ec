//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! debt ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `store`: In-memory [`domain_debt::LedgerStore`] for service tests
//! - `generators`: Property-based test data generators

pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod store;

pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use store::*;
