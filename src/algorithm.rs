//! Scheduling and recall algorithms.

use crate::traits::Item;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

/// Default cap on the number of items scheduled into one session.
pub const MAX_ITEMS_PER_DAY: usize = 10;

/// Select and order the items to review now.
///
/// Due items (next recall time at or before `now`) are sorted oldest first,
/// ties keeping the caller's order, truncated to `max_per_day` and then
/// shuffled with the provided generator. The caller's collection is never
/// mutated; the returned names index back into it.
///
/// An empty result means nothing is due, not an error.
pub fn select_session<R: Rng>(
    items: &[Item],
    now: SystemTime,
    max_per_day: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut due: Vec<(SystemTime, &Item)> = items
        .iter()
        .map(|item| (item.next_recall_time(), item))
        .filter(|(next, _)| *next <= now)
        .collect();

    // Stable, so items due at the same time keep their catalog order.
    due.sort_by_key(|(next, _)| *next);
    due.truncate(max_per_day);

    let mut names: Vec<String> = due.into_iter().map(|(_, item)| item.name.clone()).collect();
    names.shuffle(rng);

    tracing::debug!(due = names.len(), "session selected");
    names
}

// Implements the SuperMemo SM-2 algorithm
// https://super-memory.com/english/ol/sm2.htm
pub mod super_memo_2 {
    use crate::traits::{Grade, MIN_PASS_GRADE};

    /// Ease factors never drop below this.
    pub const MIN_EASE_FACTOR: f32 = 1.3;

    /// Recalculate an item's statistics from one graded attempt.
    ///
    /// Pure; stamping the recall time is the caller's concern. Returns the
    /// new `(recalls, ease_factor, interval_days)`.
    pub fn update(
        recalls: u32,
        ease_factor: f32,
        interval_days: u32,
        grade: Grade,
    ) -> (u32, f32, u32) {
        debug_assert!(grade <= crate::traits::MAX_GRADE);

        if grade < MIN_PASS_GRADE {
            // Failed recall restarts the interval but keeps the ease factor.
            return (0, ease_factor, 1);
        }

        let interval_days = match recalls {
            0 => 1,
            1 => 6,
            _ => (f64::from(interval_days) * f64::from(ease_factor)).ceil() as u32,
        };

        let q = f32::from(grade);
        let ease_factor = (ease_factor - 0.8 + 0.28 * q - 0.02 * q * q).max(MIN_EASE_FACTOR);

        (recalls + 1, ease_factor, interval_days)
    }

}
