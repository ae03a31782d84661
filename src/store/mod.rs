// SPDX-License-Identifier: MIT

//! Storage layer: the persistence seam for the engine.
//!
//! The engine talks to storage only through [`RewardsStore`], so a
//! production deployment can back it with a real datastore without
//! touching engine logic. [`MemoryStore`] is the bundled implementation
//! for tests and single-instance deployments.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Transaction, User, UserQuest, Voucher};

/// All state produced by one engine operation, committed together.
///
/// Implementations must apply the whole batch or none of it; a quest
/// completion whose XP lands but whose ledger entry is lost breaks the
/// replay invariant.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// Updated user row (XP, cached level, last activity)
    pub user: Option<User>,
    /// Created or updated per-quest aggregate
    pub user_quest: Option<UserQuest>,
    /// Newly minted or freshly redeemed voucher
    pub voucher: Option<Voucher>,
    /// Ledger entries to append, in order
    pub transactions: Vec<Transaction>,
}

/// Storage operations the engine needs.
///
/// Writers are serialized per user by the engine, so implementations
/// never see two concurrent batches for the same user. Reads may run
/// concurrently with writes and must return a consistent row snapshot.
#[async_trait]
pub trait RewardsStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Create or replace a user row (account provisioning path).
    async fn put_user(&self, user: &User) -> Result<()>;

    async fn get_user_quest(&self, user_id: &str, quest_id: &str) -> Result<Option<UserQuest>>;

    async fn list_user_quests(&self, user_id: &str) -> Result<Vec<UserQuest>>;

    async fn get_voucher(&self, voucher_id: &str) -> Result<Option<Voucher>>;

    async fn list_vouchers(&self, user_id: &str) -> Result<Vec<Voucher>>;

    /// Whether any voucher already carries this code.
    async fn voucher_code_exists(&self, code: &str) -> Result<bool>;

    /// A user's ledger in append order (oldest first).
    async fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Atomically apply a write batch.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;
}
