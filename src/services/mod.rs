// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod eligibility;
pub mod engine;
pub mod ledger;
pub mod progression;
pub mod streaks;
pub mod vouchers;

pub use engine::{
    DashboardStats, DashboardView, Exchange, QuestCompletion, RewardsEngine, UserStatsView,
};
pub use progression::{LevelTable, XpApplied};
pub use vouchers::VoucherMinter;
