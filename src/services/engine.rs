// SPDX-License-Identifier: MIT

//! The rewards engine orchestrator.
//!
//! Entry points for everything that mutates per-user state, plus the
//! read-side views. Mutations run under a per-user lock spanning the
//! whole read-check-write sequence and land in storage as one atomic
//! batch; operations for different users never contend.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::{EngineConfig, ExchangeRate};
use crate::error::{EngineError, Result};
use crate::models::{
    LevelSummary, Quest, Transaction, TransactionAction, User, UserQuest, Voucher, VoucherSource,
    VoucherTemplate, VoucherType,
};
use crate::services::progression::LevelTable;
use crate::services::vouchers::{validate_redeemable, VoucherMinter};
use crate::services::{eligibility, ledger, streaks};
use crate::store::{RewardsStore, WriteBatch};
use crate::time_utils::utc_day;

/// Per-user locks; entries are created on first use and never removed.
type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Result of a successful quest completion.
#[derive(Debug, Serialize)]
pub struct QuestCompletion {
    pub xp_earned: u64,
    pub leveled_up: bool,
    pub new_level: Option<LevelSummary>,
    /// Level-up voucher, when the reached level defines one
    pub voucher: Option<Voucher>,
    pub total_xp: u64,
}

/// Result of a successful XP exchange.
#[derive(Debug, Serialize)]
pub struct Exchange {
    pub voucher: Voucher,
    pub total_xp: u64,
}

/// Profile-page statistics payload.
#[derive(Debug, Serialize)]
pub struct UserStatsView {
    pub user: User,
    pub current_level: LevelSummary,
    pub next_level: Option<LevelSummary>,
    /// Progress from the current level toward the next, `0.0..=1.0`
    pub progress_to_next: f32,
    /// Active quests in the catalog
    pub total_quests: usize,
    /// Distinct quests this user has completed at least once
    pub completed_quests: usize,
    pub available_vouchers: Vec<Voucher>,
    pub used_vouchers: Vec<Voucher>,
    /// Latest entries, newest first
    pub recent_transactions: Vec<Transaction>,
}

/// Aggregate numbers for the dashboard stats strip.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_xp: u64,
    /// Total completions across all quests
    pub quests_completed: u32,
    /// Vouchers ever issued to this user
    pub vouchers_earned: usize,
    pub current_streak: u32,
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: User,
    pub current_level: LevelSummary,
    pub next_level: Option<LevelSummary>,
    /// Progress toward the next level, `0.0..=100.0`
    pub progress_percentage: f32,
    /// Active quests this user could complete right now
    pub available_quests: Vec<Quest>,
    pub completed_quests: Vec<UserQuest>,
    /// Unused, unexpired vouchers
    pub available_vouchers: Vec<Voucher>,
    pub stats: DashboardStats,
}

/// How many ledger entries `user_stats` returns.
const RECENT_TRANSACTIONS: usize = 20;

/// The gamified rewards engine.
///
/// Cheap to clone; all shared state sits behind `Arc` so callers can
/// fan the engine out across tasks.
#[derive(Clone)]
pub struct RewardsEngine {
    config: Arc<EngineConfig>,
    store: Arc<dyn RewardsStore>,
    minter: VoucherMinter,
    user_locks: UserLocks,
}

impl RewardsEngine {
    /// Build an engine over a validated configuration and a store.
    pub fn new(config: EngineConfig, store: Arc<dyn RewardsStore>) -> Self {
        Self {
            config: Arc::new(config),
            minter: VoucherMinter::new(store.clone()),
            store,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The exclusive section for one user's mutations.
    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }

    // ─── Mutating Operations ─────────────────────────────────────

    /// Complete a quest for a user.
    ///
    /// External requirement predicates (GPS proof, photo upload) must
    /// have been verified by the caller before this point; the engine
    /// enforces the catalog rules only.
    pub async fn complete_quest(
        &self,
        user_id: &str,
        quest_id: &str,
        metadata: serde_json::Value,
    ) -> Result<QuestCompletion> {
        let quest = self
            .config
            .quest(quest_id)
            .ok_or_else(|| EngineError::QuestNotFound(quest_id.to_string()))?
            .clone();

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;
        let now = Utc::now();

        let mut user = self.load_user(user_id).await?;
        let record = self.store.get_user_quest(user_id, quest_id).await?;
        let transactions = self.store.list_transactions(user_id).await?;
        let completed_today = eligibility::completions_today(&transactions, quest_id, now);

        eligibility::check(&quest, record.as_ref(), completed_today, now)?;

        let table = LevelTable::new(&self.config.levels);
        let applied = table.apply_delta(user.total_xp, user.current_level, quest.xp_reward as i64);
        user.total_xp = applied.total_xp;
        user.current_level = applied.level;
        user.last_activity = now;

        // Mint the level-up voucher before building the batch so all
        // writes land together.
        let voucher = match applied.new_level.and_then(|l| l.levelup_voucher.as_ref()) {
            Some(template) => Some(
                self.minter
                    .mint(
                        user_id,
                        template,
                        VoucherSource::LevelUp,
                        applied.new_level.map(|l| l.level.to_string()),
                        now,
                    )
                    .await?,
            ),
            None => None,
        };

        let user_quest = match record {
            Some(mut record) => {
                record.record_completion(quest.xp_reward, now);
                record
            }
            None => UserQuest::first_completion(user_id, quest_id, quest.xp_reward, now),
        };

        let mut batch_txs = vec![Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: TransactionAction::QuestCompleted,
            xp_change: quest.xp_reward as i64,
            quest_id: Some(quest_id.to_string()),
            voucher_id: None,
            description: format!("Completed '{}'", quest.title),
            metadata,
            timestamp: now,
        }];

        if let Some(level) = applied.new_level {
            batch_txs.push(Transaction {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                action: TransactionAction::LevelUp,
                xp_change: 0,
                quest_id: None,
                voucher_id: voucher.as_ref().map(|v| v.id.clone()),
                description: format!("Reached level {} ({})", level.level, level.name),
                metadata: serde_json::Value::Null,
                timestamp: now,
            });
        }

        let total_xp = user.total_xp;
        let new_level = applied.new_level.map(LevelSummary::from);
        let leveled_up = applied.leveled_up;

        self.store
            .commit(WriteBatch {
                user: Some(user),
                user_quest: Some(user_quest),
                voucher: voucher.clone(),
                transactions: batch_txs,
            })
            .await?;

        tracing::info!(
            user_id,
            quest_id,
            xp = quest.xp_reward,
            leveled_up,
            total_xp,
            "Quest completed"
        );

        if cfg!(debug_assertions) {
            self.check_ledger(user_id, total_xp).await?;
        }

        Ok(QuestCompletion {
            xp_earned: quest.xp_reward,
            leveled_up,
            new_level,
            voucher,
            total_xp,
        })
    }

    /// Exchange XP for a partner voucher.
    pub async fn exchange_xp(&self, user_id: &str, rate_index: usize) -> Result<Exchange> {
        let rate = self
            .config
            .exchange_rate(rate_index)
            .ok_or(EngineError::InvalidExchangeRate(rate_index))?
            .clone();

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;
        let now = Utc::now();

        let mut user = self.load_user(user_id).await?;
        if user.total_xp < rate.xp_cost {
            return Err(EngineError::InsufficientXp {
                required: rate.xp_cost,
                available: user.total_xp,
            });
        }

        // Deduction goes through the same delta path as rewards; the
        // cached level never drops even if XP lands below its floor.
        let table = LevelTable::new(&self.config.levels);
        let applied = table.apply_delta(user.total_xp, user.current_level, -(rate.xp_cost as i64));
        user.total_xp = applied.total_xp;
        user.current_level = applied.level;
        user.last_activity = now;

        let voucher = self
            .minter
            .mint(
                user_id,
                &exchange_template(&rate),
                VoucherSource::XpExchange,
                Some(rate_index.to_string()),
                now,
            )
            .await?;

        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: TransactionAction::XpExchanged,
            xp_change: -(rate.xp_cost as i64),
            quest_id: None,
            voucher_id: Some(voucher.id.clone()),
            description: format!(
                "Exchanged {} XP for {}% off at {}",
                rate.xp_cost, rate.discount_percentage, rate.partner
            ),
            metadata: serde_json::Value::Null,
            timestamp: now,
        };

        let total_xp = user.total_xp;
        self.store
            .commit(WriteBatch {
                user: Some(user),
                user_quest: None,
                voucher: Some(voucher.clone()),
                transactions: vec![tx],
            })
            .await?;

        tracing::info!(
            user_id,
            rate_index,
            xp_cost = rate.xp_cost,
            total_xp,
            "XP exchanged for voucher"
        );

        if cfg!(debug_assertions) {
            self.check_ledger(user_id, total_xp).await?;
        }

        Ok(Exchange { voucher, total_xp })
    }

    /// Redeem a voucher.
    ///
    /// A voucher owned by a different user reports `VOUCHER_NOT_FOUND`
    /// rather than leaking that the id exists. Not idempotent: the
    /// second call fails `VOUCHER_ALREADY_USED`.
    pub async fn redeem_voucher(&self, user_id: &str, voucher_id: &str) -> Result<Voucher> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;
        let now = Utc::now();

        let mut user = self.load_user(user_id).await?;
        let mut voucher = self
            .store
            .get_voucher(voucher_id)
            .await?
            .filter(|v| v.user_id == user_id)
            .ok_or_else(|| EngineError::VoucherNotFound(voucher_id.to_string()))?;

        validate_redeemable(&voucher, now)?;

        voucher.is_used = true;
        voucher.used_at = Some(now);
        user.last_activity = now;

        self.store
            .commit(WriteBatch {
                user: Some(user),
                user_quest: None,
                voucher: Some(voucher.clone()),
                transactions: vec![],
            })
            .await?;

        tracing::info!(user_id, voucher_id, partner = %voucher.partner, "Voucher redeemed");
        Ok(voucher)
    }

    /// Zero a user's XP and level after a serious violation.
    ///
    /// A dedicated operation rather than a negative delta: the ledger
    /// entry records the true forfeited amount so replay stays exact,
    /// and the level resets along with the balance. Returns the
    /// forfeited XP.
    pub async fn reset_xp(&self, user_id: &str, reason: &str) -> Result<u64> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;
        let now = Utc::now();

        let mut user = self.load_user(user_id).await?;
        let forfeited = user.total_xp;
        user.total_xp = 0;
        user.current_level = self.config.levels[0].level;
        user.last_activity = now;

        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: TransactionAction::XpReset,
            xp_change: -(forfeited as i64),
            quest_id: None,
            voucher_id: None,
            description: reason.to_string(),
            metadata: serde_json::Value::Null,
            timestamp: now,
        };

        self.store
            .commit(WriteBatch {
                user: Some(user),
                user_quest: None,
                voucher: None,
                transactions: vec![tx],
            })
            .await?;

        tracing::warn!(user_id, forfeited, reason, "XP reset");

        if cfg!(debug_assertions) {
            self.check_ledger(user_id, 0).await?;
        }

        Ok(forfeited)
    }

    // ─── Read Surface ────────────────────────────────────────────

    /// Profile statistics for one user. Lock-free.
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStatsView> {
        let now = Utc::now();
        let user = self.load_user(user_id).await?;
        let table = LevelTable::new(&self.config.levels);

        let current = table
            .get(user.current_level)
            .unwrap_or_else(|| table.level_for_xp(user.total_xp));
        let next = table.next_level(current.level);
        let progress = table.progress_toward_next(user.total_xp, current.level);

        let completed = self.store.list_user_quests(user_id).await?;
        let vouchers = self.store.list_vouchers(user_id).await?;
        let (available_vouchers, used_vouchers): (Vec<Voucher>, Vec<Voucher>) = vouchers
            .into_iter()
            .partition(|v| v.is_available(now));
        let used_vouchers = used_vouchers.into_iter().filter(|v| v.is_used).collect();

        let mut transactions = self.store.list_transactions(user_id).await?;
        transactions.reverse(); // newest first
        transactions.truncate(RECENT_TRANSACTIONS);

        Ok(UserStatsView {
            current_level: LevelSummary::from(current),
            next_level: next.map(LevelSummary::from),
            progress_to_next: progress,
            total_quests: self.config.quests.iter().filter(|q| q.is_active).count(),
            completed_quests: completed.len(),
            available_vouchers,
            used_vouchers,
            recent_transactions: transactions,
            user,
        })
    }

    /// Dashboard payload for one user. Lock-free.
    pub async fn dashboard(&self, user_id: &str) -> Result<DashboardView> {
        let now = Utc::now();
        let user = self.load_user(user_id).await?;
        let table = LevelTable::new(&self.config.levels);

        let current = table
            .get(user.current_level)
            .unwrap_or_else(|| table.level_for_xp(user.total_xp));
        let next = table.next_level(current.level);
        let progress = table.progress_toward_next(user.total_xp, current.level);

        let completed_quests = self.store.list_user_quests(user_id).await?;
        let vouchers = self.store.list_vouchers(user_id).await?;
        let transactions = self.store.list_transactions(user_id).await?;

        // Quests this user could complete right now, per the guard.
        let mut available_quests = Vec::new();
        for quest in self.config.quests.iter().filter(|q| q.is_active) {
            let record = completed_quests.iter().find(|uq| uq.quest_id == quest.id);
            let today = eligibility::completions_today(&transactions, &quest.id, now);
            if eligibility::check(quest, record, today, now).is_ok() {
                available_quests.push(quest.clone());
            }
        }

        let quests_completed = completed_quests.iter().map(|uq| uq.completion_count).sum();
        let vouchers_earned = vouchers.len();
        let available_vouchers: Vec<Voucher> = vouchers
            .into_iter()
            .filter(|v| v.is_available(now))
            .collect();
        let current_streak = streaks::current_streak(&transactions, utc_day(now));

        Ok(DashboardView {
            current_level: LevelSummary::from(current),
            next_level: next.map(LevelSummary::from),
            progress_percentage: progress * 100.0,
            available_quests,
            completed_quests,
            available_vouchers,
            stats: DashboardStats {
                total_xp: user.total_xp,
                quests_completed,
                vouchers_earned,
                current_streak,
            },
            user,
        })
    }

    /// All vouchers ever issued to a user, oldest first.
    pub async fn vouchers(&self, user_id: &str) -> Result<Vec<Voucher>> {
        self.load_user(user_id).await?;
        self.store.list_vouchers(user_id).await
    }

    /// A user's full ledger in append order.
    pub async fn transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.load_user(user_id).await?;
        self.store.list_transactions(user_id).await
    }

    // ─── Audit ───────────────────────────────────────────────────

    /// Verify the ledger replay invariant for one user.
    pub async fn check_ledger(&self, user_id: &str, expected_total: u64) -> Result<()> {
        let transactions = self.store.list_transactions(user_id).await?;
        let replayed = ledger::replay_total(&transactions);
        if replayed != expected_total {
            tracing::warn!(
                user_id,
                replayed,
                expected_total,
                "Ledger replay does not match XP total"
            );
            return Err(EngineError::Internal(anyhow::anyhow!(
                "ledger replay for {} gives {}, user total is {}",
                user_id,
                replayed,
                expected_total
            )));
        }
        Ok(())
    }
}

/// An exchange rate expressed as a voucher template.
fn exchange_template(rate: &ExchangeRate) -> VoucherTemplate {
    VoucherTemplate {
        discount_percentage: rate.discount_percentage,
        expiry_days: rate.expiry_days,
        partner: rate.partner.clone(),
        voucher_type: VoucherType::Discount,
    }
}
