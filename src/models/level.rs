//! Level table models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::voucher::VoucherType;

/// Template for a voucher minted when a user reaches a level.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VoucherTemplate {
    /// Percent off at the partner, 1..=100
    #[validate(range(min = 1, max = 100))]
    pub discount_percentage: u8,
    /// Days until the minted voucher expires
    #[validate(range(min = 1))]
    pub expiry_days: u32,
    /// Partner honoring the voucher
    #[validate(length(min = 1))]
    pub partner: String,
    pub voucher_type: VoucherType,
}

/// One row of the level table.
///
/// XP ranges are closed: a user is at this level while
/// `min_xp <= total_xp <= max_xp`. The top level leaves `max_xp` unset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Level {
    /// Level number, 1-based and consecutive
    pub level: u32,
    #[validate(length(min = 1))]
    pub name: String,
    /// Lowest XP total that places a user at this level
    pub min_xp: u64,
    /// Highest XP total for this level; `None` for the unbounded top level
    #[serde(default)]
    pub max_xp: Option<u64>,
    /// Perks shown to the user (free descriptions, not enforced here)
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Badge asset name
    pub badge: String,
    /// Voucher minted on reaching this level, if any
    #[serde(default)]
    #[validate(nested)]
    pub levelup_voucher: Option<VoucherTemplate>,
}

/// Compact level info for response payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: u32,
    pub name: String,
    pub badge: String,
}

impl From<&Level> for LevelSummary {
    fn from(level: &Level) -> Self {
        Self {
            level: level.level,
            name: level.name.clone(),
            badge: level.badge.clone(),
        }
    }
}
