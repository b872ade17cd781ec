//! Customer entity
//!
//! A customer is one counterparty tracked for debt purposes. The entity
//! holds identity and contact details only; its balance view is derived
//! from orders by the summary aggregator and is never directly writable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledger_kernel::{CustomerId, EntityState};

/// A customer/counterparty in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Display name
    pub name: String,
    /// Legal/real name, if known
    pub real_name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Address or region
    pub location: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Soft-delete state
    pub state: EntityState,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new active customer.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new_v7(),
            name: name.into(),
            real_name: None,
            phone: None,
            location: None,
            remarks: None,
            state: EntityState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the real name
    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    /// Sets the contact phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Soft-deletes the customer record. Idempotent.
    ///
    /// The caller is responsible for verifying the customer has no active
    /// orders first; that policy lives in the service layer where the order
    /// set is visible.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.state.soft_delete(now);
        self.updated_at = now;
    }
}

/// Fields accepted when creating or updating a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

impl Customer {
    /// Applies an identity edit, bumping the update timestamp.
    pub fn update_details(&mut self, details: CustomerDetails, now: DateTime<Utc>) {
        self.name = details.name;
        self.real_name = details.real_name;
        self.phone = details.phone;
        self.location = details.location;
        self.remarks = details.remarks;
        self.updated_at = now;
    }
}
