// SPDX-License-Identifier: MIT

//! Ledger replay: the audit invariant.
//!
//! Replaying a user's transactions in append order, clamping at zero,
//! must reproduce their current XP total exactly. The engine checks
//! this after every commit in debug builds; tests assert it after
//! arbitrary operation sequences.

use crate::models::Transaction;

/// Fold a ledger into the XP total it implies.
///
/// Each delta saturates at zero, matching the engine's penalty
/// semantics: overshooting negative deltas are absorbed, not carried
/// as debt.
pub fn replay_total(transactions: &[Transaction]) -> u64 {
    transactions
        .iter()
        .fold(0u64, |total, tx| total.saturating_add_signed(tx.xp_change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionAction;
    use chrono::Utc;

    fn tx(action: TransactionAction, xp_change: i64) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            action,
            xp_change,
            quest_id: None,
            voucher_id: None,
            description: String::new(),
            metadata: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_replay_sums_signed_deltas() {
        let ledger = vec![
            tx(TransactionAction::QuestCompleted, 50),
            tx(TransactionAction::QuestCompleted, 120),
            tx(TransactionAction::LevelUp, 0),
            tx(TransactionAction::XpExchanged, -100),
        ];
        assert_eq!(replay_total(&ledger), 70);
    }

    #[test]
    fn test_replay_clamps_at_zero() {
        let ledger = vec![
            tx(TransactionAction::QuestCompleted, 30),
            // Recorded penalty exceeds the balance; the excess is absorbed.
            tx(TransactionAction::XpReset, -30),
            tx(TransactionAction::QuestCompleted, 10),
        ];
        assert_eq!(replay_total(&ledger), 10);
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(replay_total(&[]), 0);
    }
}
