//! ============================================================================
//! ACCESS-CORE: CRYB Token-Gated Access Engine
//! ============================================================================
//! Pure decision engine consulted before granting access:
//! - Recursive AND/OR requirement trees over on/off-chain facts
//! - Global tier ladder resolution (Explorer through Diamond)
//! - Per-community grant/deny with tier and permission set
//! - Result cache with explicit, manual-only invalidation
//!
//! The engine performs no blockchain calls and no enforcement; facts arrive
//! through the `FactProvider` boundary and decisions go back to the caller.
//! ============================================================================

pub mod cache;
pub mod community;
pub mod engine;
pub mod evaluator;
pub mod level;
pub mod provider;
pub mod requirement;
pub mod types;

// Re-export main types for convenience
pub use cache::{CacheScope, CachedValue, ResultCache};
pub use community::resolve_community_access;
pub use engine::{AccessEngine, AccessError};
pub use evaluator::{evaluate, evaluate_all, EvalResult};
pub use level::{level_icon, AccessLevel, AccessLevelLadder, LevelRung};
pub use provider::{FactProvider, StaticFactProvider};
pub use requirement::{cryb, format_cryb_amount, CombineOperator, Requirement, CRYB_DECIMALS, ONE_CRYB};
pub use types::{
    AccessDecision, CommunityAccessConfig, CommunityLevel, CommunityMembership, FactSnapshot,
    GrantedLevel, Permission,
};
