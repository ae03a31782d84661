// SPDX-License-Identifier: MIT

//! Level lookup and XP delta application.
//!
//! Pure logic over the validated level table. The orchestrator owns
//! persistence; nothing here touches storage.

use crate::models::Level;

/// Outcome of applying an XP delta.
#[derive(Debug)]
pub struct XpApplied<'a> {
    /// New XP total, clamped at zero
    pub total_xp: u64,
    /// Effective level number after the mutation
    pub level: u32,
    /// Whether a level boundary was crossed upward
    pub leveled_up: bool,
    /// The level reached, when `leveled_up`
    pub new_level: Option<&'a Level>,
}

/// Read-only view over the validated level table.
#[derive(Debug, Clone, Copy)]
pub struct LevelTable<'a> {
    levels: &'a [Level],
}

impl<'a> LevelTable<'a> {
    /// Wrap a validated level slice (see `EngineConfig::check`).
    pub fn new(levels: &'a [Level]) -> Self {
        Self { levels }
    }

    /// The highest level whose `min_xp` does not exceed `xp`.
    ///
    /// Total over all `xp >= 0` for a validated table (level 1 starts
    /// at 0), and monotonic non-decreasing in `xp`.
    pub fn level_for_xp(&self, xp: u64) -> &'a Level {
        self.levels
            .iter()
            .rev()
            .find(|l| xp >= l.min_xp)
            .unwrap_or(&self.levels[0])
    }

    /// Look up a level row by number.
    pub fn get(&self, level: u32) -> Option<&'a Level> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// The level after `level`, if any.
    pub fn next_level(&self, level: u32) -> Option<&'a Level> {
        self.levels.iter().find(|l| l.level == level + 1)
    }

    /// Apply a signed XP delta to a user's state.
    ///
    /// XP clamps at zero; excess penalty is absorbed, never carried as
    /// debt. The level is recomputed but never lowered: an exchange may
    /// leave XP below the cached level's floor (one-directional leveling).
    pub fn apply_delta(&self, total_xp: u64, current_level: u32, delta: i64) -> XpApplied<'a> {
        let new_total = total_xp.saturating_add_signed(delta);
        let computed = self.level_for_xp(new_total);

        if computed.level > current_level {
            XpApplied {
                total_xp: new_total,
                level: computed.level,
                leveled_up: true,
                new_level: Some(computed),
            }
        } else {
            XpApplied {
                total_xp: new_total,
                level: current_level,
                leveled_up: false,
                new_level: None,
            }
        }
    }

    /// Progress from the current level toward the next, in `0.0..=1.0`.
    ///
    /// 1.0 at the top level. Clamped to 0.0 when XP sits below the
    /// cached level's floor after an exchange.
    pub fn progress_toward_next(&self, total_xp: u64, current_level: u32) -> f32 {
        let Some(current) = self.get(current_level) else {
            return 0.0;
        };
        let Some(next) = self.next_level(current_level) else {
            return 1.0;
        };

        let span = next.min_xp - current.min_xp;
        if span == 0 {
            return 1.0;
        }
        let into_level = total_xp.saturating_sub(current.min_xp).min(span);
        (into_level as f32) / (span as f32)
    }
}
