// SPDX-License-Identifier: MIT

//! Streak computation over the ledger.
//!
//! A day counts toward the streak if any transaction with a positive
//! XP delta falls in it (UTC days). Pure over the ledger slice; cheap
//! enough to recompute on every dashboard read.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::models::Transaction;
use crate::time_utils::utc_day;

/// Consecutive active days ending at `today` (or yesterday).
///
/// An empty `today` does not break the streak — the walk just starts at
/// yesterday. The first empty day before that ends the count.
pub fn current_streak(transactions: &[Transaction], today: NaiveDate) -> u32 {
    let active_days: HashSet<NaiveDate> = transactions
        .iter()
        .filter(|tx| tx.xp_change > 0)
        .map(|tx| utc_day(tx.timestamp))
        .collect();

    let mut day = if active_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while active_days.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}
