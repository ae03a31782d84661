//! Append-only ledger entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAction {
    /// A quest completion awarded XP
    QuestCompleted,
    /// A level boundary was crossed (zero-delta, descriptive)
    LevelUp,
    /// XP was spent on a voucher
    XpExchanged,
    /// An administrative reset zeroed the balance
    XpReset,
}

/// Immutable audit record of one XP-affecting event.
///
/// The ledger is append-only and is the sole source for streak
/// computation and historical reporting. Replaying a user's entries
/// (clamped at zero) must always reproduce their current XP total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Storage id (UUID)
    pub id: String,
    pub user_id: String,
    pub action: TransactionAction,
    /// Signed XP delta; zero for descriptive entries
    pub xp_change: i64,
    #[serde(default)]
    pub quest_id: Option<String>,
    #[serde(default)]
    pub voucher_id: Option<String>,
    /// Human-readable summary ("Completed 'Old Town Check-in'")
    pub description: String,
    /// Caller-supplied context (verification proof ids, device info)
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
