//! Core journal functionality without I/O operations.
//!
//! This module contains pure logic over calendar dates and entry text:
//! streak arithmetic, word counting, month boundaries and default titles.
//! Nothing here touches the store or the clock; callers pass "today" in.

use crate::constants::{ENTRY_TITLE_DATE_FORMAT, ENTRY_TITLE_PREFIX, WORD_DELIMITERS};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Current and longest run of consecutive days with an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    /// Run ending today, or yesterday when today has no entry yet.
    pub current: u32,
    /// Longest run anywhere in the history.
    pub longest: u32,
}

/// Computes streak statistics from the dates that have an entry.
///
/// Duplicate dates are ignored. The current streak counts back from `today`
/// if it has an entry, otherwise from the day before; if neither day has an
/// entry the current streak is zero. An empty history yields `(0, 0)`.
///
/// # Examples
///
/// ```
/// use daybook::journal_core::compute_streaks;
/// use chrono::{Duration, NaiveDate};
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let dates = [0, 1, 2, 4].map(|n| today - Duration::days(n));
///
/// let stats = compute_streaks(dates, today);
/// assert_eq!((stats.current, stats.longest), (3, 3));
/// ```
pub fn compute_streaks<I>(dates: I, today: NaiveDate) -> StreakStats
where
    I: IntoIterator<Item = NaiveDate>,
{
    let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
    if distinct.is_empty() {
        return StreakStats::default();
    }

    let yesterday = today - Duration::days(1);
    let anchor = if distinct.contains(&today) {
        Some(today)
    } else if distinct.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current = 0;
    if let Some(mut day) = anchor {
        while distinct.contains(&day) {
            current += 1;
            day -= Duration::days(1);
        }
    }

    // BTreeSet iterates ascending
    let mut longest = 1;
    let mut run = 1;
    let mut previous: Option<NaiveDate> = None;
    for &date in &distinct {
        if let Some(prev) = previous {
            if prev.succ_opt() == Some(date) {
                run += 1;
            } else {
                run = 1;
            }
            longest = longest.max(run);
        }
        previous = Some(date);
    }

    StreakStats { current, longest }
}

/// Counts whitespace-delimited words in `text`.
///
/// Only space, carriage return and newline separate words; runs of
/// delimiters collapse and empty tokens are discarded.
///
/// ```
/// use daybook::journal_core::count_words;
///
/// assert_eq!(count_words("one two\nthree"), 3);
/// assert_eq!(count_words("  \r\n "), 0);
/// ```
pub fn count_words(text: &str) -> usize {
    text.split(WORD_DELIMITERS)
        .filter(|token| !token.is_empty())
        .count()
}

/// Counts entries per non-empty primary mood.
pub fn tally_moods<'a, I>(moods: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut distribution = BTreeMap::new();
    for mood in moods.into_iter().filter(|m| !m.is_empty()) {
        *distribution.entry(mood.to_string()).or_insert(0) += 1;
    }
    distribution
}

/// First and last day of a calendar month, or `None` for an invalid
/// year/month pair.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Every day of a calendar month in order.
pub fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    match month_bounds(year, month) {
        Some((first, last)) => first.iter_days().take_while(|d| *d <= last).collect(),
        None => Vec::new(),
    }
}

/// Whether `date` falls inside the given calendar month.
pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Title given to a freshly created entry, e.g.
/// "Entry for Monday, January 15, 2024".
pub fn default_entry_title(date: NaiveDate) -> String {
    format!(
        "{} {}",
        ENTRY_TITLE_PREFIX,
        date.format(ENTRY_TITLE_DATE_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_before(today: NaiveDate, offsets: &[i64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|n| today - Duration::days(*n))
            .collect()
    }

    #[test]
    fn test_streaks_with_gap() {
        let today = day(2024, 1, 15);
        let stats = compute_streaks(days_before(today, &[0, 1, 2, 4]), today);
        assert_eq!(stats, StreakStats { current: 3, longest: 3 });
    }

    #[test]
    fn test_current_streak_counts_from_yesterday() {
        let today = day(2024, 1, 15);
        let stats = compute_streaks(days_before(today, &[1, 2, 3]), today);
        assert_eq!(stats.current, 3);
        assert_eq!(stats.longest, 3);
    }

    #[test]
    fn test_current_streak_zero_when_two_days_missed() {
        let today = day(2024, 1, 15);
        let stats = compute_streaks(days_before(today, &[2, 3, 4, 5]), today);
        assert_eq!(stats.current, 0);
        assert_eq!(stats.longest, 4);
    }

    #[test]
    fn test_no_entries() {
        let stats = compute_streaks(Vec::new(), day(2024, 1, 15));
        assert_eq!(stats, StreakStats { current: 0, longest: 0 });
    }

    #[test]
    fn test_single_old_entry_has_longest_one() {
        let stats = compute_streaks(vec![day(2020, 6, 1)], day(2024, 1, 15));
        assert_eq!(stats, StreakStats { current: 0, longest: 1 });
    }

    #[test]
    fn test_duplicate_dates_ignored() {
        let today = day(2024, 1, 15);
        let dates = vec![today, today, today - Duration::days(1)];
        let stats = compute_streaks(dates, today);
        assert_eq!(stats, StreakStats { current: 2, longest: 2 });
    }

    #[test]
    fn test_longest_streak_across_month_and_year_boundaries() {
        let dates = vec![
            day(2023, 12, 30),
            day(2023, 12, 31),
            day(2024, 1, 1),
            day(2024, 2, 28),
            day(2024, 2, 29),
            day(2024, 3, 1),
            day(2024, 3, 2),
        ];
        let stats = compute_streaks(dates, day(2024, 6, 1));
        assert_eq!(stats.longest, 4);
        assert_eq!(stats.current, 0);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("one two\nthree"), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("a  b\r\n\r\nc "), 3);
        // Tabs are not delimiters
        assert_eq!(count_words("a\tb"), 1);
    }

    #[test]
    fn test_tally_moods_skips_empty() {
        let tally = tally_moods(["Happy", "Happy", "Sad", ""]);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally["Happy"], 2);
        assert_eq!(tally["Sad"], 1);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((day(2024, 2, 1), day(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2023, 12),
            Some((day(2023, 12, 1), day(2023, 12, 31)))
        );
        assert_eq!(month_bounds(2024, 13), None);
        assert_eq!(month_bounds(2024, 0), None);
    }

    #[test]
    fn test_days_of_month() {
        let days = days_of_month(2023, 2);
        assert_eq!(days.len(), 28);
        assert_eq!(days[0], day(2023, 2, 1));
        assert_eq!(days[27], day(2023, 2, 28));
        assert!(days_of_month(2023, 14).is_empty());
    }

    #[test]
    fn test_is_in_month() {
        assert!(is_in_month(day(2024, 5, 31), 2024, 5));
        assert!(!is_in_month(day(2023, 5, 31), 2024, 5));
    }

    #[test]
    fn test_default_entry_title() {
        assert_eq!(
            default_entry_title(day(2024, 1, 15)),
            "Entry for Monday, January 15, 2024"
        );
    }
}
