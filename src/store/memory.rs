// SPDX-License-Identifier: MIT

//! In-memory store backed by concurrent maps.
//!
//! Suitable for tests and single-instance deployments. The engine
//! serializes writers per user, so a batch never races another batch
//! for the same rows; applying the batch map-by-map is therefore
//! equivalent to a transaction here.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::models::{Transaction, User, UserQuest, Voucher};
use crate::store::{RewardsStore, WriteBatch};

/// DashMap-backed [`RewardsStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// Keyed by (user_id, quest_id)
    user_quests: DashMap<(String, String), UserQuest>,
    vouchers: DashMap<String, Voucher>,
    /// code -> voucher id, for uniqueness checks
    voucher_codes: DashMap<String, String>,
    /// Per-user ledger in append order
    transactions: DashMap<String, Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardsStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn put_user(&self, user: &User) -> Result<()> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_quest(&self, user_id: &str, quest_id: &str) -> Result<Option<UserQuest>> {
        let key = (user_id.to_string(), quest_id.to_string());
        Ok(self.user_quests.get(&key).map(|uq| uq.clone()))
    }

    async fn list_user_quests(&self, user_id: &str) -> Result<Vec<UserQuest>> {
        let mut records: Vec<UserQuest> = self
            .user_quests
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.quest_id.cmp(&b.quest_id));
        Ok(records)
    }

    async fn get_voucher(&self, voucher_id: &str) -> Result<Option<Voucher>> {
        Ok(self.vouchers.get(voucher_id).map(|v| v.clone()))
    }

    async fn list_vouchers(&self, user_id: &str) -> Result<Vec<Voucher>> {
        let mut vouchers: Vec<Voucher> = self
            .vouchers
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        vouchers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(vouchers)
    }

    async fn voucher_code_exists(&self, code: &str) -> Result<bool> {
        Ok(self.voucher_codes.contains_key(code))
    }

    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .get(user_id)
            .map(|txs| txs.clone())
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if let Some(user) = batch.user {
            self.users.insert(user.id.clone(), user);
        }
        if let Some(user_quest) = batch.user_quest {
            let key = (user_quest.user_id.clone(), user_quest.quest_id.clone());
            self.user_quests.insert(key, user_quest);
        }
        if let Some(voucher) = batch.voucher {
            self.voucher_codes
                .insert(voucher.code.clone(), voucher.id.clone());
            self.vouchers.insert(voucher.id.clone(), voucher);
        }
        for tx in batch.transactions {
            self.transactions
                .entry(tx.user_id.clone())
                .or_default()
                .push(tx);
        }
        Ok(())
    }
}
