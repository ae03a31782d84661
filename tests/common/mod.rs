// SPDX-License-Identifier: MIT

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roam_rewards::config::EngineConfig;
use roam_rewards::models::{Transaction, TransactionAction, User, UserQuest};
use roam_rewards::services::{LevelTable, RewardsEngine};
use roam_rewards::store::{MemoryStore, RewardsStore, WriteBatch};

/// Engine over the fixture config and a fresh in-memory store.
#[allow(dead_code)]
pub fn test_engine() -> (RewardsEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = RewardsEngine::new(EngineConfig::test_default(), store.clone());
    (engine, store)
}

/// Initialize test logging once; repeat calls are no-ops.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Provision a user with a starting XP balance.
///
/// Seeds a matching grant transaction so the ledger replay invariant
/// holds from the start.
#[allow(dead_code)]
pub async fn seed_user(engine: &RewardsEngine, store: &MemoryStore, id: &str, xp: u64) -> User {
    let now = Utc::now();
    let mut user = User::new(id, "Test Visitor", now);

    if xp > 0 {
        let table = LevelTable::new(&engine.config().levels);
        user.total_xp = xp;
        user.current_level = table.level_for_xp(xp).level;
    }
    store.put_user(&user).await.expect("seed user");

    if xp > 0 {
        store
            .commit(WriteBatch {
                transactions: vec![grant_tx(id, xp as i64, now)],
                ..Default::default()
            })
            .await
            .expect("seed grant");
    }
    user
}

/// A synthetic XP grant ledger entry.
#[allow(dead_code)]
pub fn grant_tx(user_id: &str, xp_change: i64, timestamp: DateTime<Utc>) -> Transaction {
    Transaction {
        id: uuid_like(user_id, timestamp),
        user_id: user_id.to_string(),
        action: TransactionAction::QuestCompleted,
        xp_change,
        quest_id: None,
        voucher_id: None,
        description: "Starting balance".to_string(),
        metadata: serde_json::Value::Null,
        timestamp,
    }
}

/// Write `count` past completions of a quest directly into the store,
/// all stamped at `when`, bypassing the engine. Used to backdate
/// history for cooldown and daily-limit rollover tests. Updates the
/// user's XP alongside so the ledger replay invariant keeps holding.
#[allow(dead_code)]
pub async fn seed_completions(
    engine: &RewardsEngine,
    store: &MemoryStore,
    user_id: &str,
    quest_id: &str,
    xp_each: u64,
    count: u32,
    when: DateTime<Utc>,
) {
    let mut record = UserQuest::first_completion(user_id, quest_id, xp_each, when);
    for _ in 1..count {
        record.record_completion(xp_each, when);
    }

    let mut user = store
        .get_user(user_id)
        .await
        .expect("load user")
        .expect("user must be seeded first");
    let table = LevelTable::new(&engine.config().levels);
    user.total_xp += u64::from(count) * xp_each;
    user.current_level = user
        .current_level
        .max(table.level_for_xp(user.total_xp).level);

    let transactions: Vec<Transaction> = (0..count)
        .map(|i| Transaction {
            id: format!("seed-{}-{}-{}", user_id, quest_id, i),
            user_id: user_id.to_string(),
            action: TransactionAction::QuestCompleted,
            xp_change: xp_each as i64,
            quest_id: Some(quest_id.to_string()),
            voucher_id: None,
            description: "Seeded completion".to_string(),
            metadata: serde_json::Value::Null,
            timestamp: when,
        })
        .collect();

    store
        .commit(WriteBatch {
            user: Some(user),
            user_quest: Some(record),
            transactions,
            ..Default::default()
        })
        .await
        .expect("seed completions");
}

fn uuid_like(user_id: &str, timestamp: DateTime<Utc>) -> String {
    format!("seed-{}-{}", user_id, timestamp.timestamp_millis())
}
