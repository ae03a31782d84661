//! Voucher model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the voucher is good for at the partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Percentage discount on a purchase
    Discount,
    /// Free admission or item
    Freebie,
    /// Upgrade (room category, seat class, portion size)
    Upgrade,
}

/// How the voucher came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherSource {
    /// Minted automatically when the user reached a level
    LevelUp,
    /// Bought with XP through the exchange
    XpExchange,
}

/// A redeemable discount code tied to a partner.
///
/// Mutated exactly once in its life: `is_used` flips to `true` with a
/// redemption timestamp. Never deleted; past `expiry_date` an unused
/// voucher is inert but kept for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Storage id (UUID)
    pub id: String,
    /// Unique unguessable code the partner scans
    pub code: String,
    pub user_id: String,
    /// Percent off, 1..=100
    pub discount_percentage: u8,
    pub expiry_date: DateTime<Utc>,
    pub is_used: bool,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
    /// Partner honoring the voucher
    pub partner: String,
    pub voucher_type: VoucherType,
    pub source: VoucherSource,
    /// Id of the originating event (level number or exchange-rate index)
    #[serde(default)]
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    /// Expiry is computed, never stored as a flag.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expiry_date < now
    }

    /// Usable right now: never redeemed and not yet past expiry.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expiry_date >= now
    }
}
