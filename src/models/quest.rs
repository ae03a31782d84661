//! Quest catalog models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of action a quest asks the visitor to perform.
///
/// The engine treats these as opaque labels; proof that the action
/// actually happened (GPS fix, uploaded photo, social post) is verified
/// by an external collaborator before the engine is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestAction {
    /// GPS check-in at a point of interest
    CheckIn,
    /// Photo uploaded from a location
    PhotoUpload,
    /// Shared the destination on social media
    SocialShare,
    /// Wrote a review for a partner venue
    Review,
    /// Attended a listed event
    EventAttendance,
}

/// A catalog-listed action a user can perform for XP.
///
/// Static administered configuration; the engine enforces only the
/// repeatability, cooldown, and daily-limit rules. Entries in
/// `requirements` are opaque predicates evaluated upstream.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Quest {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub action: QuestAction,
    /// XP awarded per successful completion
    pub xp_reward: u64,
    /// Inactive quests are listed nowhere and complete nowhere
    pub is_active: bool,
    /// One-shot quests can only ever be completed once
    pub is_repeatable: bool,
    /// Minimum hours between completions, if set
    #[serde(default)]
    pub cooldown_hours: Option<u32>,
    /// Cap on completions within one UTC calendar day, if set
    #[serde(default)]
    pub max_completions_per_day: Option<u32>,
    /// Opaque requirement predicates (e.g. "gps:radius=150m")
    #[serde(default)]
    pub requirements: Vec<String>,
}
