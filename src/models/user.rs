//! User and per-quest progress models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's progression state.
///
/// Created at account provisioning (outside this crate); mutated only by
/// the engine's per-user write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable user id (also the storage key)
    pub id: String,
    /// Display name for dashboard payloads
    pub display_name: String,
    /// Lifetime experience points; never negative
    pub total_xp: u64,
    /// Cached level number. Recomputed after every XP mutation but never
    /// lowered by a delta (exchanges may leave XP below the level floor).
    pub current_level: u32,
    /// When the account entered the rewards program
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent engine mutation for this user
    pub last_activity: DateTime<Utc>,
}

impl User {
    /// A fresh user at level 1 with no XP.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            total_xp: 0,
            current_level: 1,
            created_at: now,
            last_activity: now,
        }
    }
}

/// Completion state of a quest for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Completed,
}

/// Per-(user, quest) aggregate.
///
/// Created on the first successful completion, updated on every later
/// one, never deleted. Doubles as a display record and as the cooldown
/// source of truth; the daily completion count comes from the ledger
/// since only the latest completion time is kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuest {
    pub user_id: String,
    pub quest_id: String,
    pub status: QuestStatus,
    /// Number of successful completions, all time
    pub completion_count: u32,
    /// Cumulative XP earned from this quest
    pub xp_earned: u64,
    /// Most recent completion time (cooldown anchor)
    pub last_completed_at: DateTime<Utc>,
}

impl UserQuest {
    /// Record for a first-time completion.
    pub fn first_completion(user_id: &str, quest_id: &str, xp: u64, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            quest_id: quest_id.to_string(),
            status: QuestStatus::Completed,
            completion_count: 1,
            xp_earned: xp,
            last_completed_at: now,
        }
    }

    /// Fold another successful completion into the aggregate.
    pub fn record_completion(&mut self, xp: u64, now: DateTime<Utc>) {
        self.status = QuestStatus::Completed;
        self.completion_count += 1;
        self.xp_earned += xp;
        self.last_completed_at = now;
    }
}
