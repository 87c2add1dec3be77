//! Learning-streak computation over calendar days.
//!
//! The streak is a cached projection of the user's activity history: it must
//! always be reproducible from the set of UTC days on which at least one
//! event was recorded. The functions here are pure so recomputation is
//! deterministic.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Count consecutive calendar days with activity, ending at `today` or
/// `yesterday`.
///
/// A streak anchors at `today` when it has activity; otherwise a single
/// grace day applies and the streak anchors at `yesterday`. From the anchor
/// the count walks backward one day at a time and stops at the first gap.
///
/// Returns 0 when neither `today` nor `yesterday` has activity.
#[must_use]
pub fn consecutive_days(today: NaiveDate, days: &BTreeSet<NaiveDate>) -> u32 {
    let anchor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0_u32;
    let mut cursor = anchor;
    while days.contains(&cursor) {
        streak = streak.saturating_add(1);
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}
