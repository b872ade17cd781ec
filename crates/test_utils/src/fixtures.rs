//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the ledger. Fixtures
//! are consistent and predictable for unit tests; randomized data lives in
//! `generators`.

use chrono::{DateTime, TimeZone, Utc};
use domain_debt::CustomerDetails;
use ledger_kernel::Money;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A small two-digit amount
    pub fn small() -> Money {
        Money::from_minor(1050) // 10.50
    }

    /// A typical order total
    pub fn order_total() -> Money {
        Money::from_minor(2500) // 25.00
    }

    /// A large amount for aggregate tests
    pub fn large() -> Money {
        Money::from_minor(1_000_000_00)
    }

    pub fn zero() -> Money {
        Money::zero()
    }
}

/// Parses a money literal, panicking on malformed test input.
pub fn money(s: &str) -> Money {
    Money::parse(s).expect("valid money literal in test")
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed reference instant (Jan 15, 2025)
    pub fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    /// One hour after the reference instant
    pub fn later() -> DateTime<Utc> {
        Self::reference() + chrono::Duration::hours(1)
    }
}

/// Fixture for customer test data
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// A fully-populated customer details record
    pub fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Corner Shop".to_string(),
            real_name: Some("Chen Wei".to_string()),
            phone: Some("555-0100".to_string()),
            location: Some("Market Street 12".to_string()),
            remarks: Some("pays at month end".to_string()),
        }
    }

    /// A minimal customer details record
    pub fn minimal(name: &str) -> CustomerDetails {
        CustomerDetails {
            name: name.to_string(),
            real_name: None,
            phone: None,
            location: None,
            remarks: None,
        }
    }
}
