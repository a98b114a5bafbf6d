//! Per-day aggregates derived from the ledger.
//!
//! `DailyStats` is the one canonical aggregate: the coach, the CLI and any
//! plugin read it instead of re-counting statuses themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::{CompletionStatus, Event};
use super::mood::MoodEntry;

/// A skipped event together with the excuse given for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTask {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Counts for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub pending: usize,
    /// round(100 * completed / total), 0 when there are no events.
    pub completion_rate: u32,
    pub skipped_tasks: Vec<SkippedTask>,
}

/// Percentage of completed events, rounded half up. 0 when `total` is 0.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Integer form of round(100 * completed / total) with .5 rounding up.
    ((200 * completed + total) / (2 * total)) as u32
}

/// An event with its status on a particular day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    #[serde(flatten)]
    pub event: Event,
    pub status: CompletionStatus,
}

/// Everything the coach needs about one day, read in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub stats: DailyStats,
    pub mood: Option<MoodEntry>,
    pub schedule: Vec<ScheduledEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_events() {
        assert_eq!(completion_rate(0, 0), 0);
    }

    #[test]
    fn rate_rounds_half_up() {
        assert_eq!(completion_rate(1, 8), 13); // 12.5
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(4, 5), 80);
        assert_eq!(completion_rate(3, 3), 100);
    }

    proptest::proptest! {
        #[test]
        fn rate_matches_float_rounding(total in 1usize..500, completed_seed in 0usize..500) {
            let completed = completed_seed % (total + 1);
            let exact = 100.0 * completed as f64 / total as f64;
            let rate = completion_rate(completed, total) as f64;
            proptest::prop_assert!((rate - exact).abs() <= 0.5);
            proptest::prop_assert!(rate <= 100.0);
        }
    }
}
