// SPDX-License-Identifier: MIT

//! Engine error types with stable machine-readable reason codes.
//!
//! Every ineligibility, conflict, or missing-resource outcome is an
//! ordinary `Err` value. Callers branch on `reason()` or `kind()`;
//! `Display` carries the human message. Nothing here panics.

use chrono::{DateTime, Utc};

/// Coarse taxonomy for error reporting and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User, quest, or voucher does not exist
    NotFound,
    /// Quest eligibility check failed
    Ineligible,
    /// Not enough XP, or a bad exchange-rate index
    InsufficientResource,
    /// Voucher already used or past expiry
    StateConflict,
    /// Storage backend or internal failure
    Internal,
}

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Quest not found: {0}")]
    QuestNotFound(String),

    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    #[error("Quest is not active")]
    QuestInactive,

    #[error("Quest has already been completed and is not repeatable")]
    NotRepeatable,

    #[error("Daily completion limit of {limit} reached")]
    DailyLimitReached { limit: u32 },

    #[error("Quest is on cooldown until {available_at}")]
    OnCooldown { available_at: DateTime<Utc> },

    #[error("No exchange rate at index {0}")]
    InvalidExchangeRate(usize),

    #[error("Insufficient XP: have {available}, need {required}")]
    InsufficientXp { required: u64, available: u64 },

    #[error("Voucher has already been used")]
    VoucherAlreadyUsed,

    #[error("Voucher has expired")]
    VoucherExpired,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Stable machine-readable reason code for API payloads and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::UserNotFound(_) => "USER_NOT_FOUND",
            EngineError::QuestNotFound(_) => "QUEST_NOT_FOUND",
            EngineError::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            EngineError::QuestInactive => "QUEST_INACTIVE",
            EngineError::NotRepeatable => "NOT_REPEATABLE",
            EngineError::DailyLimitReached { .. } => "DAILY_LIMIT_REACHED",
            EngineError::OnCooldown { .. } => "ON_COOLDOWN",
            EngineError::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
            EngineError::InsufficientXp { .. } => "INSUFFICIENT_XP",
            EngineError::VoucherAlreadyUsed => "VOUCHER_ALREADY_USED",
            EngineError::VoucherExpired => "VOUCHER_EXPIRED",
            EngineError::Storage(_) => "STORAGE_ERROR",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UserNotFound(_)
            | EngineError::QuestNotFound(_)
            | EngineError::VoucherNotFound(_) => ErrorKind::NotFound,
            EngineError::QuestInactive
            | EngineError::NotRepeatable
            | EngineError::DailyLimitReached { .. }
            | EngineError::OnCooldown { .. } => ErrorKind::Ineligible,
            EngineError::InvalidExchangeRate(_) | EngineError::InsufficientXp { .. } => {
                ErrorKind::InsufficientResource
            }
            EngineError::VoucherAlreadyUsed | EngineError::VoucherExpired => {
                ErrorKind::StateConflict
            }
            EngineError::Storage(_) | EngineError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
