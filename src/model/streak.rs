//! Daily streak model and streak arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of recorded work.
///
/// Keyed by date: the first write of a day inserts, later writes accumulate
/// minutes and counters and append notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStreak {
    /// `YYYY-MM-DD`, unique.
    pub date: String,
    pub minutes_worked: i64,
    pub challenge_id: Option<i64>,
    pub obstacles_encountered: i64,
    pub obstacles_solved: i64,
    pub notes: Option<String>,
}

/// Streak summary derived from the full date history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    /// Consecutive days ending today; 0 when today has no entry.
    pub current_streak: i64,
    /// Longest run of consecutive dates anywhere in history.
    pub longest_streak: i64,
    /// Total days with any entry.
    pub total_days: i64,
}

/// Compute streak statistics from recorded dates.
///
/// `dates` may arrive in any order and with duplicates; `today` anchors the
/// current-streak walk so tests can pin the clock.
#[must_use]
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakStats {
    if dates.is_empty() {
        return StreakStats::default();
    }

    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    // Walk backward from today.
    let mut current_streak = 0i64;
    let mut cursor = today;
    for date in sorted.iter().rev() {
        if *date == cursor {
            current_streak += 1;
            cursor = cursor.pred_opt().unwrap_or(cursor);
        } else if *date < cursor {
            break;
        }
    }

    // Longest run of consecutive dates.
    let mut longest = 1i64;
    let mut run = 1i64;
    for pair in sorted.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    StreakStats {
        current_streak,
        longest_streak: longest,
        total_days: sorted.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(compute_streaks(&[], d("2024-01-03")), StreakStats::default());
    }

    #[test]
    fn test_current_streak_zero_when_today_missing() {
        // Worked on the 1st, nothing since; checking on the 3rd.
        let stats = compute_streaks(&[d("2024-01-01")], d("2024-01-03"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total_days, 1);
    }

    #[test]
    fn test_current_streak_counts_back_from_today() {
        let dates = [d("2024-01-01")];
        let stats = compute_streaks(&dates, d("2024-01-01"));
        assert_eq!(stats.current_streak, 1);

        let dates = [d("2024-02-08"), d("2024-02-09"), d("2024-02-10")];
        let stats = compute_streaks(&dates, d("2024-02-10"));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn test_longest_streak_survives_gaps() {
        let dates = [
            d("2024-03-01"),
            d("2024-03-02"),
            d("2024-03-03"),
            d("2024-03-04"),
            // gap
            d("2024-03-10"),
            d("2024-03-11"),
        ];
        let stats = compute_streaks(&dates, d("2024-03-20"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 4);
        assert_eq!(stats.total_days, 6);
    }

    #[test]
    fn test_month_boundary_is_consecutive() {
        let dates = [d("2024-01-31"), d("2024-02-01")];
        let stats = compute_streaks(&dates, d("2024-02-01"));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }
}
