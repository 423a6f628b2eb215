//! ============================================================================
//! Requirement Evaluator - Pure evaluation of requirement trees
//! ============================================================================
//! Walks a requirement tree against a fact snapshot. AND nodes recurse into
//! every child (no short-circuit) so the caller can display the complete list
//! of unmet requirements; a satisfied OR branch surfaces no failure reasons.
//! Evaluation never errors: malformed requirements fail closed.
//! ============================================================================

use crate::requirement::{CombineOperator, Requirement};
use crate::types::FactSnapshot;

/// Outcome of evaluating one requirement (or an implicit-AND list).
/// `failed` holds one reason per unmet leaf, in tree order; empty when
/// satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    pub satisfied: bool,
    pub failed: Vec<String>,
}

impl EvalResult {
    fn satisfied() -> Self {
        Self {
            satisfied: true,
            failed: Vec::new(),
        }
    }

    fn unmet(reason: String) -> Self {
        Self {
            satisfied: false,
            failed: vec![reason],
        }
    }
}

/// Evaluate a single requirement against a fact snapshot
pub fn evaluate(requirement: &Requirement, facts: &FactSnapshot) -> EvalResult {
    match requirement {
        Requirement::TokenBalance { min_amount } => {
            leaf(facts.token_balance >= *min_amount, requirement)
        }
        Requirement::NftOwnership { collection_id, min_count } => {
            leaf(facts.nft_count(collection_id) >= *min_count, requirement)
        }
        Requirement::StakingAmount { min_amount } => {
            leaf(facts.staked_amount >= *min_amount, requirement)
        }
        Requirement::VerificationBadge => leaf(facts.has_verification_badge, requirement),
        Requirement::SocialScore { min_score } => {
            leaf(facts.social_score >= *min_score, requirement)
        }
        Requirement::Combined { operator, conditions } => match operator {
            CombineOperator::And => {
                let mut satisfied = true;
                let mut failed = Vec::new();
                for condition in conditions {
                    let result = evaluate(condition, facts);
                    if !result.satisfied {
                        satisfied = false;
                        failed.extend(result.failed);
                    }
                }
                EvalResult { satisfied, failed }
            }
            CombineOperator::Or => {
                let mut any = false;
                let mut failed = Vec::new();
                for condition in conditions {
                    let result = evaluate(condition, facts);
                    if result.satisfied {
                        any = true;
                    } else {
                        failed.extend(result.failed);
                    }
                }
                if any {
                    EvalResult::satisfied()
                } else {
                    EvalResult { satisfied: false, failed }
                }
            }
        },
        // Fail closed on anything we don't recognize
        Requirement::Unknown => EvalResult::unmet(requirement.describe()),
    }
}

fn leaf(satisfied: bool, requirement: &Requirement) -> EvalResult {
    if satisfied {
        EvalResult::satisfied()
    } else {
        EvalResult::unmet(requirement.describe())
    }
}

/// Evaluate a requirement list as an implicit AND, aggregating every unmet
/// leaf reason in list order. An empty list is trivially satisfied.
pub fn evaluate_all(requirements: &[Requirement], facts: &FactSnapshot) -> EvalResult {
    let mut satisfied = true;
    let mut failed = Vec::new();
    for requirement in requirements {
        let result = evaluate(requirement, facts);
        if !result.satisfied {
            satisfied = false;
            failed.extend(result.failed);
        }
    }
    EvalResult { satisfied, failed }
}
