//! ============================================================================
//! Access Engine - Cached evaluation behind the presentation boundary
//! ============================================================================
//! Owns the fact provider, the community config registry, the global ladder
//! and the result cache, and exposes the calls the presentation layer makes.
//! Decisions are cached per (user, scope) until explicitly invalidated;
//! concurrent misses for the same key may fetch facts twice, which is
//! accepted rather than coordinated here.
//! ============================================================================

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::cache::{CacheScope, CachedValue, ResultCache};
use crate::community::resolve_community_access;
use crate::level::{AccessLevel, AccessLevelLadder};
use crate::provider::FactProvider;
use crate::types::{AccessDecision, CommunityAccessConfig, CommunityMembership};

/// Typed errors surfaced at the engine boundary. Evaluation itself never
/// errors; these cover lookups the engine cannot answer.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Unknown community: {0}")]
    UnknownCommunity(String),
}

/// The token-gated access engine
pub struct AccessEngine<P: FactProvider> {
    provider: P,
    communities: HashMap<String, CommunityAccessConfig>,
    ladder: AccessLevelLadder,
    cache: ResultCache,
}

impl<P: FactProvider> AccessEngine<P> {
    /// Create an engine with the default CRYB ladder
    pub fn new(provider: P, communities: Vec<CommunityAccessConfig>) -> Self {
        Self::with_ladder(provider, communities, AccessLevelLadder::default())
    }

    pub fn with_ladder(
        provider: P,
        communities: Vec<CommunityAccessConfig>,
        ladder: AccessLevelLadder,
    ) -> Self {
        let communities = communities
            .into_iter()
            .map(|c| (c.community_id.clone(), c))
            .collect();
        Self {
            provider,
            communities,
            ladder,
            cache: ResultCache::new(),
        }
    }

    pub fn community_config(&self, community_id: &str) -> Option<&CommunityAccessConfig> {
        self.communities.get(community_id)
    }

    /// Resolve the user's global tier, serving from cache when possible
    pub async fn get_user_global_access_level(&self, user_address: &str) -> Result<AccessLevel> {
        if let Some(CachedValue::Level(level)) =
            self.cache.get(user_address, &CacheScope::Global).await
        {
            return Ok(level);
        }

        debug!(user = user_address, "global level cache miss, fetching facts");
        let facts = self.provider.fact_snapshot(user_address)?;
        let level = self.ladder.resolve(&facts);

        self.cache
            .put(
                user_address,
                CacheScope::Global,
                CachedValue::Level(level.clone()),
            )
            .await;

        info!(user = user_address, level = level.level, name = %level.name, "global level resolved");
        Ok(level)
    }

    /// Resolve the user's access to one community, serving from cache when
    /// possible
    pub async fn get_user_community_access(
        &self,
        user_address: &str,
        community_id: &str,
    ) -> Result<AccessDecision> {
        let config = self
            .communities
            .get(community_id)
            .ok_or_else(|| AccessError::UnknownCommunity(community_id.to_string()))?;

        let scope = CacheScope::Community(community_id.to_string());
        if let Some(CachedValue::Decision(decision)) = self.cache.get(user_address, &scope).await {
            return Ok(decision);
        }

        debug!(
            user = user_address,
            community = community_id,
            "decision cache miss, fetching facts"
        );
        let facts = self.provider.fact_snapshot(user_address)?;
        let decision = resolve_community_access(config, &facts);

        self.cache
            .put(user_address, scope, CachedValue::Decision(decision.clone()))
            .await;

        Ok(decision)
    }

    /// Memberships already resolved upstream. Not cached here: the provider
    /// owns this denormalized list, and it carries no decision of ours.
    pub fn get_user_communities(&self, user_address: &str) -> Result<Vec<CommunityMembership>> {
        self.provider.user_communities(user_address)
    }

    /// Drop every cached decision and level (e.g. after a config reload)
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Drop cached results for one user (e.g. wallet reconnect)
    pub async fn invalidate_user(&self, user_address: &str) {
        self.cache.invalidate(Some(user_address), None).await;
    }

    /// Drop cached decisions for one community (e.g. admin changed its
    /// requirements)
    pub async fn invalidate_community(&self, community_id: &str) {
        self.cache
            .invalidate(None, Some(&CacheScope::Community(community_id.to_string())))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticFactProvider;
    use crate::requirement::{cryb, Requirement};
    use crate::types::{CommunityLevel, FactSnapshot, Permission};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that counts snapshot fetches so tests can assert cache hits
    struct CountingProvider {
        facts: FactSnapshot,
        calls: AtomicU32,
    }

    impl CountingProvider {
        fn new(facts: FactSnapshot) -> Self {
            Self {
                facts,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FactProvider for CountingProvider {
        fn fact_snapshot(&self, _user_address: &str) -> Result<FactSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.facts.clone())
        }

        fn user_communities(&self, _user_address: &str) -> Result<Vec<CommunityMembership>> {
            Ok(vec![])
        }
    }

    fn dao_config() -> CommunityAccessConfig {
        CommunityAccessConfig {
            community_id: "cryb-dao".into(),
            name: "CRYB DAO".into(),
            description: String::new(),
            requirements: vec![Requirement::TokenBalance { min_amount: cryb(1_000) }],
            access_level: Some(CommunityLevel {
                name: "Member".into(),
                description: "DAO member".into(),
                permissions: vec![Permission::Vote],
            }),
        }
    }

    #[tokio::test]
    async fn test_community_access_end_to_end() {
        let provider = StaticFactProvider::new().with_snapshot(
            "0xabc",
            FactSnapshot {
                token_balance: cryb(2_000),
                ..Default::default()
            },
        );
        let engine = AccessEngine::new(provider, vec![dao_config()]);

        let decision = engine
            .get_user_community_access("0xabc", "cryb-dao")
            .await
            .unwrap();
        assert!(decision.granted);
        assert_eq!(decision.permissions, vec![Permission::Vote]);
    }

    #[tokio::test]
    async fn test_unknown_community_is_an_error() {
        let engine = AccessEngine::new(StaticFactProvider::new(), vec![]);
        let err = engine
            .get_user_community_access("0xabc", "nope")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown community"));
    }

    #[tokio::test]
    async fn test_decision_served_from_cache_until_invalidated() {
        let provider = CountingProvider::new(FactSnapshot::default());
        let engine = AccessEngine::new(provider, vec![dao_config()]);

        let first = engine
            .get_user_community_access("0xabc", "cryb-dao")
            .await
            .unwrap();
        let second = engine
            .get_user_community_access("0xabc", "cryb-dao")
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.provider.call_count(), 1);

        engine.invalidate_user("0xabc").await;
        engine
            .get_user_community_access("0xabc", "cryb-dao")
            .await
            .unwrap();
        assert_eq!(engine.provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_global_level_cached_independently_of_decisions() {
        let provider = CountingProvider::new(FactSnapshot {
            token_balance: cryb(1_000),
            ..Default::default()
        });
        let engine = AccessEngine::new(provider, vec![dao_config()]);

        let level = engine.get_user_global_access_level("0xabc").await.unwrap();
        assert_eq!(level.level, 2);
        engine.get_user_global_access_level("0xabc").await.unwrap();
        assert_eq!(engine.provider.call_count(), 1);

        // Invalidating the community scope leaves the global entry alone
        engine.invalidate_community("cryb-dao").await;
        engine.get_user_global_access_level("0xabc").await.unwrap();
        assert_eq!(engine.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let provider = CountingProvider::new(FactSnapshot::default());
        let engine = AccessEngine::new(provider, vec![dao_config()]);

        engine.get_user_global_access_level("0xabc").await.unwrap();
        engine.clear_cache().await;
        engine.get_user_global_access_level("0xabc").await.unwrap();
        assert_eq!(engine.provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_memberships_pass_through() {
        let provider = StaticFactProvider::new().with_memberships(
            "0xabc",
            vec![CommunityMembership {
                community_id: "cryb-dao".into(),
                access_level_name: "Member".into(),
            }],
        );
        let engine = AccessEngine::new(provider, vec![]);

        let memberships = engine.get_user_communities("0xabc").unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].access_level_name, "Member");
    }
}
