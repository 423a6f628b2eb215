//! ============================================================================
//! Requirement Model - Declarative access conditions
//! ============================================================================
//! A requirement is either a single condition on a user's facts or a nested
//! AND/OR combination of conditions. Trees are immutable configuration loaded
//! once per community; depth is bounded by config size, not by this module.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Number of decimals in raw $CRYB amounts
pub const CRYB_DECIMALS: u32 = 18;

/// One whole $CRYB token in raw (smallest) units
pub const ONE_CRYB: u128 = 1_000_000_000_000_000_000;

/// Convert a whole-token amount into raw 18-decimal units
pub const fn cryb(amount: u64) -> u128 {
    amount as u128 * ONE_CRYB
}

/// Boolean operator for combined requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombineOperator {
    And,
    Or,
}

/// A single access condition or a nested boolean combination of conditions.
///
/// Unrecognized tags deserialize to `Unknown`, which the evaluator treats as
/// never satisfied, so one malformed entry cannot crash a sibling list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Requirement {
    /// Hold at least `min_amount` raw $CRYB
    TokenBalance {
        #[serde(with = "token_amount")]
        min_amount: u128,
    },
    /// Own at least `min_count` NFTs from a collection
    NftOwnership { collection_id: String, min_count: u64 },
    /// Have at least `min_amount` raw $CRYB staked
    StakingAmount {
        #[serde(with = "token_amount")]
        min_amount: u128,
    },
    /// Hold the platform verification badge
    VerificationBadge,
    /// Have a social score of at least `min_score`
    SocialScore { min_score: u64 },
    /// AND/OR combination of nested requirements
    Combined {
        operator: CombineOperator,
        conditions: Vec<Requirement>,
    },
    #[serde(other)]
    Unknown,
}

impl Requirement {
    /// Human-readable description of what it takes to satisfy this
    /// requirement. For leaves this is the exact string surfaced in
    /// `AccessDecision::failed_requirements`.
    pub fn describe(&self) -> String {
        match self {
            Requirement::TokenBalance { min_amount } => {
                format!("Hold {} CRYB tokens", format_cryb_amount(*min_amount))
            }
            Requirement::NftOwnership { min_count, .. } => {
                format!("Own {} NFT(s) from collection", min_count)
            }
            Requirement::StakingAmount { min_amount } => {
                format!("Stake {} CRYB tokens", format_cryb_amount(*min_amount))
            }
            Requirement::VerificationBadge => "Have verified badge".to_string(),
            Requirement::SocialScore { min_score } => {
                format!("Social score ≥ {}", min_score)
            }
            Requirement::Combined { operator, conditions } => {
                let op = match operator {
                    CombineOperator::And => " AND ",
                    CombineOperator::Or => " OR ",
                };
                conditions
                    .iter()
                    .map(|c| c.describe())
                    .collect::<Vec<_>>()
                    .join(op)
            }
            Requirement::Unknown => "Unknown requirement".to_string(),
        }
    }
}

/// Format a raw 18-decimal amount as a human amount with thousands
/// separators. Integral amounts render with no decimal places; fractional
/// amounts keep the fraction with trailing zeros trimmed.
pub fn format_cryb_amount(raw: u128) -> String {
    let whole = raw / ONE_CRYB;
    let frac = raw % ONE_CRYB;

    let mut out = group_thousands(whole);
    if frac != 0 {
        let digits = format!("{:018}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Serde codec for raw token amounts.
///
/// Raw 18-decimal values overflow u64 and lose precision as JSON numbers,
/// so amounts serialize as decimal strings; input accepts either an integer
/// or a string of digits.
pub(crate) mod token_amount {
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct AmountVisitor;

        impl<'de> de::Visitor<'de> for AmountVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a raw token amount as an unsigned integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("token amount cannot be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse()
                    .map_err(|_| E::custom(format!("invalid token amount '{}'", v)))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
