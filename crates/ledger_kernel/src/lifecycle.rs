//! Entity lifecycle state
//!
//! Every record in the ledger is soft-deleted, never physically removed.
//! [`EntityState`] makes the active/deleted distinction a tagged type so that
//! read paths cannot forget to filter: aggregates match on `Active`, history
//! queries see both variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Soft-delete state of a ledger entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntityState {
    /// The entity participates in all active aggregates.
    Active,
    /// The entity is retained for audit but excluded from active totals.
    Deleted { deleted_at: DateTime<Utc> },
}

impl EntityState {
    pub fn is_active(&self) -> bool {
        matches!(self, EntityState::Active)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, EntityState::Deleted { .. })
    }

    /// Returns the deletion timestamp, if deleted.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            EntityState::Active => None,
            EntityState::Deleted { deleted_at } => Some(*deleted_at),
        }
    }

    /// Marks the entity deleted at `now`.
    ///
    /// Idempotent: deleting an already-deleted entity keeps the original
    /// timestamp. There is no reverse operation; hard deletion is forbidden.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        if let EntityState::Active = self {
            *self = EntityState::Deleted { deleted_at: now };
        }
    }
}

impl Default for EntityState {
    fn default() -> Self {
        EntityState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_delete_sets_timestamp() {
        let mut state = EntityState::Active;
        let now = Utc::now();
        state.soft_delete(now);

        assert!(state.is_deleted());
        assert_eq!(state.deleted_at(), Some(now));
    }

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut state = EntityState::Active;
        let first = Utc::now();
        state.soft_delete(first);
        let later = first + chrono::Duration::hours(1);
        state.soft_delete(later);

        assert_eq!(state.deleted_at(), Some(first));
    }

    #[test]
    fn test_default_is_active() {
        assert!(EntityState::default().is_active());
    }
}
