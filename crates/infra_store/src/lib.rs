//! PostgreSQL storage layer for the debt ledger
//!
//! Provides the connection pool, schema migrations, and the
//! [`PgLedgerStore`] implementation of the domain's storage port.

pub mod error;
pub mod pool;
pub mod store;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabasePool, StoreConfig};
pub use store::PgLedgerStore;
