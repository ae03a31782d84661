//! Engine configuration: level table, quest catalog, exchange rates.
//!
//! Loaded once at startup from a JSON file and validated; malformed
//! config (gapped level table, duplicate quest ids, zero-percent
//! vouchers) is fatal at load time, never at request time.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Level, Quest};

/// One row of the XP exchange table.
///
/// Callers reference rows by index, so ordering is part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExchangeRate {
    /// XP deducted on exchange
    #[validate(range(min = 1))]
    pub xp_cost: u64,
    /// Percent off at the partner, 1..=100
    #[validate(range(min = 1, max = 100))]
    pub discount_percentage: u8,
    /// Days until the minted voucher expires
    #[validate(range(min = 1))]
    pub expiry_days: u32,
    /// Partner honoring the voucher
    #[validate(length(min = 1))]
    pub partner: String,
}

/// Static engine configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    /// Level table, ordered by level number
    #[validate(nested)]
    pub levels: Vec<Level>,
    /// Quest catalog
    #[validate(nested)]
    pub quests: Vec<Quest>,
    /// XP exchange offers, referenced by index
    #[validate(nested)]
    pub exchange_rates: Vec<ExchangeRate>,
}

impl EngineConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&data)
    }

    /// Load and validate configuration from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        tracing::info!(
            levels = config.levels.len(),
            quests = config.quests.len(),
            exchange_rates = config.exchange_rates.len(),
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from the path named by `ROAM_REWARDS_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let path =
            env::var("ROAM_REWARDS_CONFIG").map_err(|_| ConfigError::Missing("ROAM_REWARDS_CONFIG"))?;
        Self::from_file(path)
    }

    /// Run field-level and structural validation.
    ///
    /// Structural rules, beyond the derive-level bounds:
    /// - level numbers are 1-based and consecutive
    /// - XP ranges start at 0, are contiguous (`max_xp + 1 == next.min_xp`),
    ///   and only the last level is unbounded
    /// - quest ids are unique
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("level table is empty".to_string()));
        }
        if self.levels[0].min_xp != 0 {
            return Err(ConfigError::Invalid(format!(
                "level {} must start at 0 XP, starts at {}",
                self.levels[0].level, self.levels[0].min_xp
            )));
        }

        for (i, level) in self.levels.iter().enumerate() {
            if level.level != (i as u32) + 1 {
                return Err(ConfigError::Invalid(format!(
                    "level numbers must be consecutive from 1; found {} at position {}",
                    level.level, i
                )));
            }

            let is_last = i == self.levels.len() - 1;
            match (level.max_xp, is_last) {
                (None, false) => {
                    return Err(ConfigError::Invalid(format!(
                        "level {} is unbounded but is not the top level",
                        level.level
                    )));
                }
                (Some(max), _) if max < level.min_xp => {
                    return Err(ConfigError::Invalid(format!(
                        "level {} has max_xp {} below min_xp {}",
                        level.level, max, level.min_xp
                    )));
                }
                (Some(max), false) => {
                    let next = &self.levels[i + 1];
                    if max + 1 != next.min_xp {
                        return Err(ConfigError::Invalid(format!(
                            "gap between level {} (max_xp {}) and level {} (min_xp {})",
                            level.level, max, next.level, next.min_xp
                        )));
                    }
                }
                _ => {}
            }
        }

        let mut seen = std::collections::HashSet::new();
        for quest in &self.quests {
            if !seen.insert(quest.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate quest id: {}",
                    quest.id
                )));
            }
        }

        Ok(())
    }

    /// Look up a quest by id.
    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == quest_id)
    }

    /// Look up an exchange rate by index.
    pub fn exchange_rate(&self, index: usize) -> Option<&ExchangeRate> {
        self.exchange_rates.get(index)
    }

    /// Small fixture configuration for tests.
    pub fn test_default() -> Self {
        use crate::models::quest::QuestAction;
        use crate::models::voucher::VoucherType;
        use crate::models::VoucherTemplate;

        let config = Self {
            levels: vec![
                Level {
                    level: 1,
                    name: "Wanderer".to_string(),
                    min_xp: 0,
                    max_xp: Some(99),
                    benefits: vec!["Newsletter".to_string()],
                    badge: "badge-wanderer".to_string(),
                    levelup_voucher: None,
                },
                Level {
                    level: 2,
                    name: "Explorer".to_string(),
                    min_xp: 100,
                    max_xp: Some(299),
                    benefits: vec!["Partner discounts".to_string()],
                    badge: "badge-explorer".to_string(),
                    levelup_voucher: Some(VoucherTemplate {
                        discount_percentage: 10,
                        expiry_days: 30,
                        partner: "Harbor Cruises".to_string(),
                        voucher_type: VoucherType::Discount,
                    }),
                },
                Level {
                    level: 3,
                    name: "Pathfinder".to_string(),
                    min_xp: 300,
                    max_xp: Some(599),
                    benefits: vec!["Early event access".to_string()],
                    badge: "badge-pathfinder".to_string(),
                    levelup_voucher: None,
                },
                Level {
                    level: 4,
                    name: "Globetrotter".to_string(),
                    min_xp: 600,
                    max_xp: None,
                    benefits: vec!["VIP partner lounge".to_string()],
                    badge: "badge-globetrotter".to_string(),
                    levelup_voucher: Some(VoucherTemplate {
                        discount_percentage: 25,
                        expiry_days: 60,
                        partner: "Grand Hotel".to_string(),
                        voucher_type: VoucherType::Upgrade,
                    }),
                },
            ],
            quests: vec![
                Quest {
                    id: "checkin-old-town".to_string(),
                    title: "Old Town Check-in".to_string(),
                    action: QuestAction::CheckIn,
                    xp_reward: 50,
                    is_active: true,
                    is_repeatable: true,
                    cooldown_hours: None,
                    max_completions_per_day: Some(3),
                    requirements: vec!["gps:radius=150m".to_string()],
                },
                Quest {
                    id: "photo-harbor".to_string(),
                    title: "Harbor Photo".to_string(),
                    action: QuestAction::PhotoUpload,
                    xp_reward: 120,
                    is_active: true,
                    is_repeatable: false,
                    cooldown_hours: None,
                    max_completions_per_day: None,
                    requirements: vec!["photo:uploaded".to_string()],
                },
                Quest {
                    id: "review-museum".to_string(),
                    title: "Museum Review".to_string(),
                    action: QuestAction::Review,
                    xp_reward: 80,
                    is_active: true,
                    is_repeatable: true,
                    cooldown_hours: Some(24),
                    max_completions_per_day: None,
                    requirements: vec![],
                },
                Quest {
                    id: "closed-festival".to_string(),
                    title: "Festival Attendance".to_string(),
                    action: QuestAction::EventAttendance,
                    xp_reward: 200,
                    is_active: false,
                    is_repeatable: true,
                    cooldown_hours: None,
                    max_completions_per_day: None,
                    requirements: vec![],
                },
            ],
            exchange_rates: vec![
                ExchangeRate {
                    xp_cost: 500,
                    discount_percentage: 10,
                    expiry_days: 30,
                    partner: "Old Town Bistro".to_string(),
                },
                ExchangeRate {
                    xp_cost: 1000,
                    discount_percentage: 20,
                    expiry_days: 45,
                    partner: "Harbor Cruises".to_string(),
                },
            ],
        };
        config.check().expect("test fixture config must be valid");
        config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
