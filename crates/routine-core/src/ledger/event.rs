//! Events and per-day completion records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// When an event is a candidate for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Recurrence {
    /// Belongs to exactly one calendar day.
    OneTime { date: NaiveDate },
    /// Candidate for every day, with independent per-day status.
    Recurring,
}

impl Recurrence {
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        match self {
            Recurrence::Recurring => true,
            Recurrence::OneTime { date } => *date == day,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::OneTime { .. } => "one-time",
            Recurrence::Recurring => "recurring",
        }
    }
}

/// Input for `Ledger::add_event`. Id and timestamps are assigned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(flatten)]
    pub recurrence: Recurrence,
}

impl EventDraft {
    pub fn one_time(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            time: None,
            recurrence: Recurrence::OneTime { date },
        }
    }

    pub fn recurring(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            time: None,
            recurrence: Recurrence::Recurring,
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title".into()));
        }
        Ok(())
    }
}

/// A scheduled item on the user's routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(flatten)]
    pub recurrence: Recurrence,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub(crate) fn from_draft(id: String, draft: EventDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            time: draft.time,
            recurrence: draft.recurrence,
            created_at,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.recurrence, Recurrence::Recurring)
    }

    /// "HH:MM", or "unscheduled" when no time of day was given.
    pub fn time_label(&self) -> String {
        self.time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "unscheduled".to_string())
    }
}

/// Outcome of one event on one day. `Pending` is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Completed,
    Skipped,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Pending => "pending",
            CompletionStatus::Completed => "completed",
            CompletionStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored outcome for a (day, event) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompletionRecord {
    Completed {
        completed_at: DateTime<Utc>,
    },
    Skipped {
        skipped_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl CompletionRecord {
    pub fn status(&self) -> CompletionStatus {
        match self {
            CompletionRecord::Completed { .. } => CompletionStatus::Completed,
            CompletionRecord::Skipped { .. } => CompletionStatus::Skipped,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CompletionRecord::Skipped { reason, .. } => reason.as_deref(),
            CompletionRecord::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn recurring_occurs_every_day() {
        assert!(Recurrence::Recurring.occurs_on(day("2026-01-01")));
        assert!(Recurrence::Recurring.occurs_on(day("2031-07-19")));
    }

    #[test]
    fn one_time_occurs_only_on_its_date() {
        let r = Recurrence::OneTime {
            date: day("2026-10-19"),
        };
        assert!(r.occurs_on(day("2026-10-19")));
        assert!(!r.occurs_on(day("2026-10-20")));
    }

    #[test]
    fn event_json_shape_is_flat() {
        let event = Event::from_draft(
            "e1".into(),
            EventDraft::one_time("Gym", day("2026-10-19"))
                .at(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            Utc::now(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "one-time");
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["title"], "Gym");
        assert!(json.get("description").is_none());

        let recurring = Event::from_draft("e2".into(), EventDraft::recurring("Meditate"), Utc::now());
        let json = serde_json::to_value(&recurring).unwrap();
        assert_eq!(json["type"], "recurring");
        assert!(json.get("date").is_none());
        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, recurring);
    }

    #[test]
    fn time_label_formats_or_marks_unscheduled() {
        let timed = Event::from_draft(
            "e1".into(),
            EventDraft::recurring("Run").at(NaiveTime::from_hms_opt(6, 30, 0).unwrap()),
            Utc::now(),
        );
        assert_eq!(timed.time_label(), "06:30");
        let untimed = Event::from_draft("e2".into(), EventDraft::recurring("Read"), Utc::now());
        assert_eq!(untimed.time_label(), "unscheduled");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(EventDraft::recurring("   ").validate().is_err());
        assert!(EventDraft::recurring("Stretch").validate().is_ok());
    }

    #[test]
    fn record_status_tag() {
        let skipped = CompletionRecord::Skipped {
            skipped_at: Utc::now(),
            reason: Some("too tired".into()),
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "too tired");
        assert_eq!(skipped.status(), CompletionStatus::Skipped);
        assert_eq!(skipped.reason(), Some("too tired"));
    }
}
