//! Payloads carried through the hook points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{CompletionStatus, Event};

/// An event about to be removed, or just removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    pub id: String,
    /// The stored event, if the id was known.
    pub event: Option<Event>,
}

/// One row of the day's timeline as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub event: Event,
    pub status: CompletionStatus,
    /// Short labels plugins attach to the row.
    #[serde(default)]
    pub badges: Vec<String>,
}

/// The header shown above a day's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub badges: Vec<String>,
}

impl Header {
    pub fn for_day(date: NaiveDate) -> Self {
        Self {
            date,
            title: date.format("%A, %B %-d").to_string(),
            badges: Vec::new(),
        }
    }
}
