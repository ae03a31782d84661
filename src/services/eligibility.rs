// SPDX-License-Identifier: MIT

//! Anti-spam guard: quest eligibility checks.
//!
//! Owns exactly four rules, checked in order: active flag,
//! repeatability, daily limit, cooldown. External requirement
//! predicates (GPS proximity, photo proof, prior-quest gating) are
//! verified by a collaborator before the engine is called and are not
//! re-checked here. Pure functions over catalog config and history.

use chrono::{DateTime, Duration, Utc};

use crate::error::{EngineError, Result};
use crate::models::{Quest, QuestStatus, Transaction, TransactionAction, UserQuest};
use crate::time_utils::same_utc_day;

/// Check whether a quest completion is currently allowed.
///
/// `record` is the user's aggregate for this quest (if any) and
/// `completed_today` the count of their completions of it within the
/// current UTC day, taken from the ledger.
pub fn check(
    quest: &Quest,
    record: Option<&UserQuest>,
    completed_today: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    if !quest.is_active {
        return Err(EngineError::QuestInactive);
    }

    if !quest.is_repeatable {
        if let Some(record) = record {
            if record.status == QuestStatus::Completed {
                return Err(EngineError::NotRepeatable);
            }
        }
    }

    if let Some(limit) = quest.max_completions_per_day {
        if completed_today >= limit {
            return Err(EngineError::DailyLimitReached { limit });
        }
    }

    if let Some(hours) = quest.cooldown_hours {
        if let Some(record) = record {
            let available_at = record.last_completed_at + Duration::hours(i64::from(hours));
            if now < available_at {
                return Err(EngineError::OnCooldown { available_at });
            }
        }
    }

    Ok(())
}

/// Count a user's completions of `quest_id` within the UTC day of `now`.
///
/// The ledger is the source of truth here: the `UserQuest` aggregate
/// keeps only the latest completion time.
pub fn completions_today(transactions: &[Transaction], quest_id: &str, now: DateTime<Utc>) -> u32 {
    transactions
        .iter()
        .filter(|tx| {
            tx.action == TransactionAction::QuestCompleted
                && tx.quest_id.as_deref() == Some(quest_id)
                && same_utc_day(tx.timestamp, now)
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::TimeZone;

    fn quest(config: &EngineConfig, id: &str) -> Quest {
        config.quest(id).unwrap().clone()
    }

    fn record_at(last_completed_at: DateTime<Utc>) -> UserQuest {
        UserQuest {
            user_id: "u1".to_string(),
            quest_id: "q1".to_string(),
            status: QuestStatus::Completed,
            completion_count: 1,
            xp_earned: 50,
            last_completed_at,
        }
    }

    fn completion_tx(quest_id: &str, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            action: TransactionAction::QuestCompleted,
            xp_change: 50,
            quest_id: Some(quest_id.to_string()),
            voucher_id: None,
            description: String::new(),
            metadata: serde_json::Value::Null,
            timestamp,
        }
    }

    #[test]
    fn test_inactive_quest_denied_first() {
        let config = EngineConfig::test_default();
        let quest = quest(&config, "closed-festival");
        let now = Utc::now();

        // Inactive wins even when other rules would also deny.
        let record = record_at(now);
        let err = check(&quest, Some(&record), 99, now).unwrap_err();
        assert_eq!(err.reason(), "QUEST_INACTIVE");
    }

    #[test]
    fn test_non_repeatable_denied_after_first_completion() {
        let config = EngineConfig::test_default();
        let quest = quest(&config, "photo-harbor");
        let now = Utc::now();

        assert!(check(&quest, None, 0, now).is_ok());

        let record = record_at(now - Duration::days(30));
        let err = check(&quest, Some(&record), 0, now).unwrap_err();
        assert_eq!(err.reason(), "NOT_REPEATABLE");
    }

    #[test]
    fn test_daily_limit_boundary() {
        let config = EngineConfig::test_default();
        let quest = quest(&config, "checkin-old-town"); // limit 3
        let now = Utc::now();
        let record = record_at(now);

        assert!(check(&quest, Some(&record), 2, now).is_ok());
        let err = check(&quest, Some(&record), 3, now).unwrap_err();
        assert_eq!(err.reason(), "DAILY_LIMIT_REACHED");
    }

    #[test]
    fn test_cooldown_window() {
        let config = EngineConfig::test_default();
        let quest = quest(&config, "review-museum"); // 24h cooldown
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();

        let recent = record_at(now - Duration::hours(23));
        let err = check(&quest, Some(&recent), 0, now).unwrap_err();
        assert_eq!(err.reason(), "ON_COOLDOWN");
        if let EngineError::OnCooldown { available_at } = err {
            assert_eq!(available_at, recent.last_completed_at + Duration::hours(24));
        }

        let stale = record_at(now - Duration::hours(24));
        assert!(check(&quest, Some(&stale), 0, now).is_ok());
    }

    #[test]
    fn test_first_attempt_passes_all_rules() {
        let config = EngineConfig::test_default();
        for id in ["checkin-old-town", "photo-harbor", "review-museum"] {
            let quest = quest(&config, id);
            assert!(check(&quest, None, 0, Utc::now()).is_ok(), "quest {}", id);
        }
    }

    #[test]
    fn test_completions_today_counts_only_same_utc_day_and_quest() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
        let txs = vec![
            completion_tx("q1", now - Duration::hours(2)),
            completion_tx("q1", now - Duration::hours(9)),
            // Previous UTC day
            completion_tx("q1", now - Duration::hours(12)),
            // Different quest, same day
            completion_tx("q2", now - Duration::hours(1)),
        ];

        assert_eq!(completions_today(&txs, "q1", now), 2);
        assert_eq!(completions_today(&txs, "q2", now), 1);
        assert_eq!(completions_today(&txs, "q3", now), 0);
    }
}
