//! ============================================================================
//! Access Level Resolver - Global tier ladder
//! ============================================================================
//! Maps a fact snapshot to exactly one global access level. The ladder is
//! static config ordered ascending by level; resolution walks it from the
//! top and returns the first rung whose threshold holds. Level 0 has no
//! threshold, so resolution is total.
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::evaluate_all;
use crate::requirement::{cryb, Requirement};
use crate::types::FactSnapshot;

/// One rung of the global tier ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLevel {
    pub level: u8,
    pub name: String,
    pub color: String,
    pub benefits: Vec<String>,
}

impl AccessLevel {
    /// Presentation icon for this level. Pure ordinal-to-symbol table
    /// consumed by the UI; carries no gating logic.
    pub fn icon(&self) -> &'static str {
        level_icon(self.level)
    }
}

/// Ordinal-to-icon table: generic badge at the baseline, bronze/silver
/// medal for 1-2, crown for gold tiers, star from level 5 up.
pub fn level_icon(level: u8) -> &'static str {
    match level {
        0 => "badge",
        1 | 2 => "medal",
        3 | 4 => "crown",
        _ => "star",
    }
}

/// A level together with the fact thresholds that unlock it, ANDed with the
/// same leaf semantics the requirement evaluator uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRung {
    #[serde(flatten)]
    pub level: AccessLevel,
    #[serde(default)]
    pub threshold: Vec<Requirement>,
}

/// The fixed global ladder. Construction sorts rungs ascending by level so
/// resolution can walk from the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLevelLadder {
    rungs: Vec<LevelRung>,
}

impl AccessLevelLadder {
    pub fn new(mut rungs: Vec<LevelRung>) -> Self {
        rungs.sort_by_key(|r| r.level.level);
        Self { rungs }
    }

    pub fn rungs(&self) -> &[LevelRung] {
        &self.rungs
    }

    /// Resolve the global level for a snapshot: highest rung first, first
    /// fully satisfied threshold wins, baseline rung as the floor.
    pub fn resolve(&self, facts: &FactSnapshot) -> AccessLevel {
        for rung in self.rungs.iter().rev() {
            if evaluate_all(&rung.threshold, facts).satisfied {
                debug!(level = rung.level.level, name = %rung.level.name, "resolved global level");
                return rung.level.clone();
            }
        }
        // Reachable only with an empty ladder; the default ladder always
        // carries a thresholdless baseline.
        AccessLevel {
            level: 0,
            name: "Explorer".to_string(),
            color: "#9CA3AF".to_string(),
            benefits: Vec::new(),
        }
    }
}

impl Default for AccessLevelLadder {
    fn default() -> Self {
        Self::new(vec![
            rung(0, "Explorer", "#9CA3AF", &["Browse public communities"], vec![]),
            rung(
                1,
                "Bronze",
                "#CD7F32",
                &["Join token-gated communities", "Member badge"],
                vec![Requirement::TokenBalance { min_amount: cryb(100) }],
            ),
            rung(
                2,
                "Silver",
                "#C0C0C0",
                &["Priority support", "Early feature access"],
                vec![Requirement::TokenBalance { min_amount: cryb(1_000) }],
            ),
            rung(
                3,
                "Gold",
                "#FFD700",
                &["Governance voting", "Exclusive drops"],
                vec![Requirement::TokenBalance { min_amount: cryb(10_000) }],
            ),
            rung(
                4,
                "Platinum",
                "#E5E4E2",
                &["Community creation", "Revenue share"],
                vec![
                    Requirement::TokenBalance { min_amount: cryb(100_000) },
                    Requirement::SocialScore { min_score: 50 },
                ],
            ),
            rung(
                5,
                "Diamond",
                "#B9F2FF",
                &["Platform council seat", "Direct team access"],
                vec![
                    Requirement::TokenBalance { min_amount: cryb(1_000_000) },
                    Requirement::VerificationBadge,
                ],
            ),
        ])
    }
}

fn rung(
    level: u8,
    name: &str,
    color: &str,
    benefits: &[&str],
    threshold: Vec<Requirement>,
) -> LevelRung {
    LevelRung {
        level: AccessLevel {
            level,
            name: name.to_string(),
            color: color.to_string(),
            benefits: benefits.iter().map(|b| b.to_string()).collect(),
        },
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_facts(raw: u128) -> FactSnapshot {
        FactSnapshot {
            token_balance: raw,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_facts_resolve_to_baseline() {
        let ladder = AccessLevelLadder::default();
        let level = ladder.resolve(&FactSnapshot::default());
        assert_eq!(level.level, 0);
        assert_eq!(level.name, "Explorer");
    }

    #[test]
    fn test_highest_satisfied_rung_wins() {
        let ladder = AccessLevelLadder::default();

        assert_eq!(ladder.resolve(&balance_facts(cryb(100))).level, 1);
        assert_eq!(ladder.resolve(&balance_facts(cryb(999))).level, 1);
        assert_eq!(ladder.resolve(&balance_facts(cryb(1_000))).level, 2);
        assert_eq!(ladder.resolve(&balance_facts(cryb(50_000))).level, 3);
    }

    #[test]
    fn test_platinum_needs_social_score_too() {
        let ladder = AccessLevelLadder::default();

        // Balance alone stops at Gold
        assert_eq!(ladder.resolve(&balance_facts(cryb(100_000))).level, 3);

        let facts = FactSnapshot {
            token_balance: cryb(100_000),
            social_score: 50,
            ..Default::default()
        };
        assert_eq!(ladder.resolve(&facts).level, 4);
    }

    #[test]
    fn test_diamond_needs_badge() {
        let ladder = AccessLevelLadder::default();

        let facts = FactSnapshot {
            token_balance: cryb(1_000_000),
            social_score: 50,
            has_verification_badge: true,
            ..Default::default()
        };
        assert_eq!(ladder.resolve(&facts).level, 5);
    }

    #[test]
    fn test_resolution_is_monotone_in_balance() {
        let ladder = AccessLevelLadder::default();
        let mut last = 0;
        for raw in [0, cryb(99), cryb(100), cryb(1_000), cryb(10_000), cryb(200_000)] {
            let level = ladder.resolve(&balance_facts(raw)).level;
            assert!(level >= last, "level dropped at balance {}", raw);
            last = level;
        }
    }

    #[test]
    fn test_empty_ladder_still_resolves() {
        let ladder = AccessLevelLadder::new(vec![]);
        assert_eq!(ladder.resolve(&FactSnapshot::default()).level, 0);
    }

    #[test]
    fn test_icon_table() {
        assert_eq!(level_icon(0), "badge");
        assert_eq!(level_icon(1), "medal");
        assert_eq!(level_icon(2), "medal");
        assert_eq!(level_icon(3), "crown");
        assert_eq!(level_icon(4), "crown");
        assert_eq!(level_icon(5), "star");
        assert_eq!(level_icon(9), "star");
    }

    #[test]
    fn test_rungs_sorted_on_construction() {
        let ladder = AccessLevelLadder::new(vec![
            rung(2, "B", "#fff", &[], vec![]),
            rung(1, "A", "#fff", &[], vec![]),
        ]);
        let levels: Vec<u8> = ladder.rungs().iter().map(|r| r.level.level).collect();
        assert_eq!(levels, vec![1, 2]);
    }
}
