//! ============================================================================
//! Community Access Resolver - Grant/deny decisions per community
//! ============================================================================
//! Applies a community's requirement list to a fact snapshot. Granting is
//! binary: permissions and the configured tier are attached only when every
//! requirement passes.
//! ============================================================================

use tracing::{info, warn};

use crate::evaluator::evaluate_all;
use crate::types::{AccessDecision, CommunityAccessConfig, FactSnapshot, GrantedLevel};

/// Resolve a user's access to a community. Pure: the caller owns caching
/// and persistence of the decision.
pub fn resolve_community_access(
    config: &CommunityAccessConfig,
    facts: &FactSnapshot,
) -> AccessDecision {
    // No requirements means the community is open to everyone
    if config.requirements.is_empty() {
        return granted_decision(config);
    }

    let result = evaluate_all(&config.requirements, facts);
    if result.satisfied {
        info!(community = %config.community_id, "access granted");
        granted_decision(config)
    } else {
        warn!(
            community = %config.community_id,
            unmet = result.failed.len(),
            "access denied"
        );
        AccessDecision::denied(result.failed)
    }
}

fn granted_decision(config: &CommunityAccessConfig) -> AccessDecision {
    let access_level = config.access_level.as_ref().map(|l| GrantedLevel {
        name: l.name.clone(),
        description: l.description.clone(),
    });
    let permissions = config
        .access_level
        .as_ref()
        .map(|l| l.permissions.clone())
        .unwrap_or_default();

    AccessDecision {
        granted: true,
        failed_requirements: Vec::new(),
        access_level,
        permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{cryb, Requirement};
    use crate::types::{CommunityLevel, Permission};

    fn gated_config() -> CommunityAccessConfig {
        CommunityAccessConfig {
            community_id: "cryb-dao".into(),
            name: "CRYB DAO".into(),
            description: "Governance community".into(),
            requirements: vec![
                Requirement::TokenBalance { min_amount: cryb(1_000) },
                Requirement::VerificationBadge,
            ],
            access_level: Some(CommunityLevel {
                name: "Member".into(),
                description: "Full DAO member".into(),
                permissions: vec![Permission::Post, Permission::Vote],
            }),
        }
    }

    #[test]
    fn test_empty_requirements_always_grant() {
        let config = CommunityAccessConfig {
            community_id: "open".into(),
            name: "Open Lounge".into(),
            description: String::new(),
            requirements: vec![],
            access_level: Some(CommunityLevel {
                name: "Guest".into(),
                description: "Anyone".into(),
                permissions: vec![Permission::ViewContent],
            }),
        };

        let decision = resolve_community_access(&config, &FactSnapshot::default());
        assert!(decision.granted);
        assert!(decision.failed_requirements.is_empty());
        assert_eq!(decision.permissions, vec![Permission::ViewContent]);
    }

    #[test]
    fn test_empty_requirements_without_level_grant_no_permissions() {
        let config = CommunityAccessConfig {
            community_id: "open".into(),
            name: "Open Lounge".into(),
            description: String::new(),
            requirements: vec![],
            access_level: None,
        };

        let decision = resolve_community_access(&config, &FactSnapshot::default());
        assert!(decision.granted);
        assert!(decision.permissions.is_empty());
        assert!(decision.access_level.is_none());
    }

    #[test]
    fn test_only_unmet_requirements_are_reported() {
        // Badge held, balance short: exactly one failure entry
        let facts = FactSnapshot {
            token_balance: cryb(500),
            has_verification_badge: true,
            ..Default::default()
        };

        let decision = resolve_community_access(&gated_config(), &facts);
        assert!(!decision.granted);
        assert_eq!(
            decision.failed_requirements,
            vec!["Hold 1,000 CRYB tokens".to_string()]
        );
    }

    #[test]
    fn test_denied_grants_nothing() {
        let decision = resolve_community_access(&gated_config(), &FactSnapshot::default());
        assert!(!decision.granted);
        assert!(decision.permissions.is_empty());
        assert!(decision.access_level.is_none());
        assert_eq!(decision.failed_requirements.len(), 2);
    }

    #[test]
    fn test_granted_attaches_level_and_permissions() {
        let facts = FactSnapshot {
            token_balance: cryb(1_000),
            has_verification_badge: true,
            ..Default::default()
        };

        let decision = resolve_community_access(&gated_config(), &facts);
        assert!(decision.granted);
        assert!(decision.failed_requirements.is_empty());
        assert_eq!(decision.access_level.as_ref().unwrap().name, "Member");
        assert_eq!(decision.permissions, vec![Permission::Post, Permission::Vote]);
    }
}
