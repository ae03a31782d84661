//! Data models for the rewards engine.

pub mod level;
pub mod quest;
pub mod transaction;
pub mod user;
pub mod voucher;

pub use level::{Level, LevelSummary, VoucherTemplate};
pub use quest::{Quest, QuestAction};
pub use transaction::{Transaction, TransactionAction};
pub use user::{QuestStatus, User, UserQuest};
pub use voucher::{Voucher, VoucherSource, VoucherType};
