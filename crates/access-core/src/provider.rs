//! ============================================================================
//! Fact Provider - Boundary to the chain/indexing layer
//! ============================================================================
//! The engine never talks to a chain itself; it consumes measured facts
//! through this trait. A production implementation queries RPC/indexers;
//! `StaticFactProvider` serves fixed snapshots for tests and offline use.
//! ============================================================================

use anyhow::Result;
use std::collections::HashMap;

use crate::types::{CommunityMembership, FactSnapshot};

/// Supplies raw measurements for a user. Implementations own their own
/// error handling for transport failures; the engine only ever sees a valid
/// snapshot or an error it propagates to the caller.
pub trait FactProvider: Send + Sync {
    /// Current measured facts for a user. Users with no on-chain footprint
    /// get the all-zero/false snapshot, never an error.
    fn fact_snapshot(&self, user_address: &str) -> Result<FactSnapshot>;

    /// Memberships already resolved upstream. Display hint only; live
    /// evaluation is authoritative.
    fn user_communities(&self, user_address: &str) -> Result<Vec<CommunityMembership>>;
}

/// In-memory fact provider backed by fixed data
#[derive(Debug, Clone, Default)]
pub struct StaticFactProvider {
    snapshots: HashMap<String, FactSnapshot>,
    memberships: HashMap<String, Vec<CommunityMembership>>,
}

impl StaticFactProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, user_address: &str, facts: FactSnapshot) -> Self {
        self.snapshots.insert(user_address.to_string(), facts);
        self
    }

    pub fn with_memberships(
        mut self,
        user_address: &str,
        memberships: Vec<CommunityMembership>,
    ) -> Self {
        self.memberships.insert(user_address.to_string(), memberships);
        self
    }
}

impl FactProvider for StaticFactProvider {
    fn fact_snapshot(&self, user_address: &str) -> Result<FactSnapshot> {
        Ok(self.snapshots.get(user_address).cloned().unwrap_or_default())
    }

    fn user_communities(&self, user_address: &str) -> Result<Vec<CommunityMembership>> {
        Ok(self.memberships.get(user_address).cloned().unwrap_or_default())
    }
}
