//! Occurrence selection for recurring events.
//!
//! A recurring event stores an ordered list of discrete date ranges. Listings
//! show one "active" occurrence per event; [`select_occurrence`] decides
//! which one given the current instant and, on search pages, the requested
//! date window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete `[start, end]` window of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Occurrence {
    /// Creates an occurrence.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `now` falls within `[start, end]`.
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// Returns true if the occurrence has not started yet.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }
}

/// The date window of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    /// Lower bound of the search.
    pub from: DateTime<Utc>,
    /// Upper bound of the search.
    pub to: DateTime<Utc>,
    /// Whether the caller typed a start date, as opposed to the default "today".
    pub explicit_start: bool,
}

impl SearchWindow {
    /// Creates a search window.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, explicit_start: bool) -> Self {
        Self {
            from,
            to,
            explicit_start,
        }
    }
}

/// Selects the relevant occurrence of a recurring event.
///
/// Without a search window ("list" mode) the first ongoing occurrence wins,
/// then the first upcoming one; if every occurrence is in the past the
/// **last** occurrence is returned so detail views still have dates to show.
///
/// With a search window the past-fallback does not apply and only
/// occurrences starting no later than `window.to` qualify:
/// - no explicit start: first ongoing, else first upcoming, else `None`
/// - explicit start: the first occurrence with `start >= window.from`
///
/// Occurrences are scanned in the given order; they are not re-sorted.
pub fn select_occurrence(
    dates: &[Occurrence],
    now: DateTime<Utc>,
    window: Option<&SearchWindow>,
) -> Option<Occurrence> {
    let Some(window) = window else {
        return ongoing_or_upcoming(dates, now).or_else(|| dates.last().copied());
    };

    let candidates: Vec<Occurrence> = dates
        .iter()
        .filter(|d| d.start <= window.to)
        .copied()
        .collect();
    if window.explicit_start {
        candidates.into_iter().find(|d| d.start >= window.from)
    } else {
        ongoing_or_upcoming(&candidates, now)
    }
}

fn ongoing_or_upcoming(dates: &[Occurrence], now: DateTime<Utc>) -> Option<Occurrence> {
    dates
        .iter()
        .find(|d| d.is_ongoing(now))
        .or_else(|| dates.iter().find(|d| d.is_upcoming(now)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, h, min, 0).unwrap()
    }

    /// 10:00-11:00 on the 5th and the same slot two days later.
    fn two_sessions() -> Vec<Occurrence> {
        vec![
            Occurrence::new(utc(5, 10, 0), utc(5, 11, 0)),
            Occurrence::new(utc(7, 10, 0), utc(7, 11, 0)),
        ]
    }

    mod list_mode {
        use super::*;

        #[test]
        fn picks_ongoing_occurrence() {
            let dates = two_sessions();
            let selected = select_occurrence(&dates, utc(5, 10, 30), None);
            assert_eq!(selected, Some(dates[0]));
        }

        #[test]
        fn picks_next_upcoming_before_all() {
            let dates = two_sessions();
            let selected = select_occurrence(&dates, utc(4, 12, 0), None);
            assert_eq!(selected, Some(dates[0]));
        }

        #[test]
        fn picks_next_upcoming_between() {
            let dates = two_sessions();
            let selected = select_occurrence(&dates, utc(6, 12, 0), None);
            assert_eq!(selected, Some(dates[1]));
        }

        #[test]
        fn falls_back_to_last_when_all_past() {
            let dates = two_sessions();
            let selected = select_occurrence(&dates, utc(9, 12, 0), None);
            assert_eq!(selected, Some(dates[1]));
        }

        #[test]
        fn window_bounds_are_inclusive() {
            let dates = two_sessions();
            assert_eq!(select_occurrence(&dates, utc(5, 10, 0), None), Some(dates[0]));
            assert_eq!(select_occurrence(&dates, utc(5, 11, 0), None), Some(dates[0]));
        }

        #[test]
        fn ongoing_beats_earlier_listed_upcoming() {
            // Unsorted input: an upcoming session listed before the ongoing one.
            let dates = vec![
                Occurrence::new(utc(7, 10, 0), utc(7, 11, 0)),
                Occurrence::new(utc(5, 10, 0), utc(5, 11, 0)),
            ];
            let selected = select_occurrence(&dates, utc(5, 10, 30), None);
            assert_eq!(selected, Some(dates[1]));
        }

        #[test]
        fn empty_list_yields_none() {
            assert_eq!(select_occurrence(&[], utc(5, 10, 0), None), None);
        }
    }

    mod search_mode {
        use super::*;

        #[test]
        fn default_start_drops_past_events() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(9, 0, 0), utc(9, 0, 0) + Duration::days(365), false);
            assert_eq!(select_occurrence(&dates, utc(9, 12, 0), Some(&window)), None);
        }

        #[test]
        fn default_start_behaves_like_list_mode() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(5, 0, 0), utc(5, 0, 0) + Duration::days(365), false);
            assert_eq!(
                select_occurrence(&dates, utc(5, 10, 30), Some(&window)),
                Some(dates[0])
            );
        }

        #[test]
        fn explicit_start_selects_first_at_or_after_bound() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(6, 0, 0), utc(28, 0, 0), true);
            assert_eq!(
                select_occurrence(&dates, utc(5, 10, 30), Some(&window)),
                Some(dates[1])
            );
        }

        #[test]
        fn explicit_window_drops_later_sessions() {
            let dates = vec![Occurrence::new(utc(20, 10, 0), utc(20, 11, 0))];
            let window = SearchWindow::new(utc(6, 0, 0), utc(10, 23, 59), true);
            assert_eq!(select_occurrence(&dates, utc(5, 12, 0), Some(&window)), None);
        }

        #[test]
        fn end_bound_applies_without_explicit_start() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(6, 0, 0), utc(6, 23, 59), false);
            assert_eq!(select_occurrence(&dates, utc(6, 12, 0), Some(&window)), None);

            let window = SearchWindow::new(utc(6, 0, 0), utc(7, 23, 59), false);
            assert_eq!(
                select_occurrence(&dates, utc(6, 12, 0), Some(&window)),
                Some(dates[1])
            );
        }

        #[test]
        fn end_bound_includes_session_starting_inside() {
            // Starts before the bound, ends after it.
            let dates = vec![Occurrence::new(utc(10, 22, 0), utc(11, 2, 0))];
            let window = SearchWindow::new(utc(6, 0, 0), utc(10, 23, 59), true);
            assert_eq!(
                select_occurrence(&dates, utc(5, 12, 0), Some(&window)),
                Some(dates[0])
            );
        }

        #[test]
        fn explicit_start_includes_exact_bound() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(7, 10, 0), utc(28, 0, 0), true);
            assert_eq!(
                select_occurrence(&dates, utc(1, 0, 0), Some(&window)),
                Some(dates[1])
            );
        }

        #[test]
        fn explicit_start_after_all_yields_none() {
            let dates = two_sessions();
            let window = SearchWindow::new(utc(8, 0, 0), utc(28, 0, 0), true);
            assert_eq!(select_occurrence(&dates, utc(1, 0, 0), Some(&window)), None);
        }
    }
}
