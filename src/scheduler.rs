//! Spaced-repetition review scheduling.
//!
//! Pure functions mapping a self-rating (and, for items, a correctness
//! outcome) to the next review timestamp. Both take `now` explicitly so the
//! schedule is fully determined by the arguments; callers pass
//! `Utc::now()`.

use chrono::{DateTime, Duration, Utc};

/// Fallback interval for out-of-range ratings.
const DEFAULT_INTERVAL_DAYS: i64 = 7;

/// Hours until re-review after an incorrect answer.
const INCORRECT_RETRY_HOURS: i64 = 4;

/// Review interval keyed by a 1-5 rating.
///
/// The same table serves skill-level understanding ratings and item-level
/// confidence ratings. Any rating outside 1-5 falls back to the one-week
/// entry.
fn interval_for(rating: i64) -> Duration {
    let days = match rating {
        1 => 1,
        2 => 3,
        3 => 7,
        4 => 14,
        5 => 30,
        _ => DEFAULT_INTERVAL_DAYS,
    };
    Duration::days(days)
}

/// Next review for a skill after logging a study session.
///
/// Poor understanding (1) comes back tomorrow; excellent understanding (5)
/// in a month.
#[must_use]
pub fn next_review_for_session(now: DateTime<Utc>, understanding_level: i64) -> DateTime<Utc> {
    now + interval_for(understanding_level)
}

/// Next review for a learning item after recording a review.
///
/// An incorrect answer always reschedules in four hours, whatever
/// confidence the user just reported; post-failure confidence is
/// intentionally ignored, matching the tracker's long-standing behavior.
/// A correct answer uses the confidence-keyed interval table.
#[must_use]
pub fn next_review_for_item(
    now: DateTime<Utc>,
    was_correct: bool,
    confidence_after: i64,
) -> DateTime<Utc> {
    if !was_correct {
        return now + Duration::hours(INCORRECT_RETRY_HOURS);
    }
    now + interval_for(confidence_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_session_intervals_match_table() {
        let now = fixed_now();
        for (level, days) in [(1, 1), (2, 3), (3, 7), (4, 14), (5, 30)] {
            assert_eq!(
                next_review_for_session(now, level),
                now + Duration::days(days),
                "level {level}"
            );
        }
    }

    #[test]
    fn test_session_out_of_range_defaults_to_week() {
        let now = fixed_now();
        for level in [0, 6, -1, 100] {
            assert_eq!(next_review_for_session(now, level), now + Duration::days(7));
        }
    }

    #[test]
    fn test_correct_item_uses_confidence_table() {
        let now = fixed_now();
        for (conf, days) in [(1, 1), (2, 3), (3, 7), (4, 14), (5, 30)] {
            assert_eq!(
                next_review_for_item(now, true, conf),
                now + Duration::days(days)
            );
        }
        assert_eq!(next_review_for_item(now, true, 17), now + Duration::days(7));
    }

    #[test]
    fn test_incorrect_item_ignores_confidence() {
        let now = fixed_now();
        for conf in [1, 2, 3, 4, 5, 0, 99] {
            assert_eq!(
                next_review_for_item(now, false, conf),
                now + Duration::hours(4)
            );
        }
    }
}
