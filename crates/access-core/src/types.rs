//! ============================================================================
//! Core Types for the CRYB Access Engine
//! ============================================================================
//! Data structures shared across the evaluator, resolvers and cache. These
//! types are serialized to JSON for the TypeScript frontend, so field names
//! follow its camelCase convention on the wire.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::requirement::{token_amount, Requirement};

/// Per-user evaluation input, fetched fresh from the fact provider or served
/// from cache. Absence of data is zero/false, never null, so evaluation is
/// total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactSnapshot {
    /// Raw $CRYB balance in 18-decimal units
    #[serde(with = "token_amount")]
    pub token_balance: u128,
    /// Owned count per NFT collection id
    pub nft_holdings: HashMap<String, u64>,
    /// Raw staked $CRYB in 18-decimal units
    #[serde(with = "token_amount")]
    pub staked_amount: u128,
    pub has_verification_badge: bool,
    pub social_score: u64,
}

impl FactSnapshot {
    /// Owned count for a collection; unknown collections count as zero
    pub fn nft_count(&self, collection_id: &str) -> u64 {
        self.nft_holdings.get(collection_id).copied().unwrap_or(0)
    }
}

/// Permissions a community can grant to members who pass its gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewContent,
    Post,
    Comment,
    Vote,
    CreateEvents,
    Invite,
    Moderate,
    Admin,
}

impl Permission {
    /// Get human-readable permission name
    pub fn display_name(&self) -> &'static str {
        match self {
            Permission::ViewContent => "View Content",
            Permission::Post => "Post",
            Permission::Comment => "Comment",
            Permission::Vote => "Vote",
            Permission::CreateEvents => "Create Events",
            Permission::Invite => "Invite",
            Permission::Moderate => "Moderate",
            Permission::Admin => "Admin",
        }
    }
}

/// Access tier a community grants on top of the binary gate decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityLevel {
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
}

/// Per-community access declaration, supplied as static config keyed by
/// `community_id`. An empty requirement list means "always granted".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityAccessConfig {
    pub community_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub access_level: Option<CommunityLevel>,
}

/// The tier reported back on a granted decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedLevel {
    pub name: String,
    pub description: String,
}

/// Result of evaluating a user against a community's gate.
///
/// `failed_requirements` lists every unmet leaf requirement in config order
/// when denied; it is empty on grant. Permissions are all-or-nothing: a
/// partially satisfied requirement set grants none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub granted: bool,
    pub failed_requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<GrantedLevel>,
    pub permissions: Vec<Permission>,
}

impl AccessDecision {
    pub fn denied(failed_requirements: Vec<String>) -> Self {
        Self {
            granted: false,
            failed_requirements,
            access_level: None,
            permissions: Vec::new(),
        }
    }
}

/// A membership already resolved upstream, carried as a display hint. Live
/// evaluation via the community resolver is authoritative; this list can lag
/// behind config changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMembership {
    pub community_id: String,
    pub access_level_name: String,
}
