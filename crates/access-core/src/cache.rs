//! ============================================================================
//! Result Cache - Memoized decisions keyed by (user, scope)
//! ============================================================================
//! Caches evaluator/resolver outputs so repeated lookups skip the fact
//! provider. Entries never expire on their own: invalidation is explicit
//! (refresh actions, wallet reconnect, admin config changes). A capacity cap
//! with oldest-first eviction bounds memory.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::level::AccessLevel;
use crate::types::AccessDecision;

/// Maximum number of cached entries before oldest-first eviction kicks in
const MAX_CACHE_SIZE: usize = 1000;

/// What a cache entry is scoped to: the global tier ladder or one community
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheScope {
    Global,
    Community(String),
}

/// A memoized evaluation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CachedValue {
    Decision(AccessDecision),
    Level(AccessLevel),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    fetched_at: i64,
}

/// Shared result cache. Clones share the underlying map, so one cache can be
/// handed to every component that needs invalidation access.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<(String, CacheScope), CacheEntry>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value. `None` is a normal miss, not an error.
    pub async fn get(&self, user_address: &str, scope: &CacheScope) -> Option<CachedValue> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(user_address.to_string(), scope.clone()))?;
        debug!(
            user = user_address,
            ?scope,
            age_secs = chrono::Utc::now().timestamp() - entry.fetched_at,
            "cache hit"
        );
        Some(entry.value.clone())
    }

    /// Store a value, evicting the oldest entry when at capacity
    pub async fn put(&self, user_address: &str, scope: CacheScope, value: CachedValue) {
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_CACHE_SIZE {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, e)| e.fetched_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest_key);
            }
        }
        entries.insert(
            (user_address.to_string(), scope),
            CacheEntry {
                value,
                fetched_at: chrono::Utc::now().timestamp(),
            },
        );
    }

    /// Invalidate entries matching the given filters: a single entry when
    /// both are set, all entries for a user or for a scope when one is set,
    /// or the entire cache when neither is.
    pub async fn invalidate(&self, user_address: Option<&str>, scope: Option<&CacheScope>) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(user, s), _| {
            let user_matches = user_address.map_or(true, |u| u == user);
            let scope_matches = scope.map_or(true, |sc| sc == s);
            !(user_matches && scope_matches)
        });
        info!(
            removed = before - entries.len(),
            user = ?user_address,
            scope = ?scope,
            "cache invalidated"
        );
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.invalidate(None, None).await;
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
