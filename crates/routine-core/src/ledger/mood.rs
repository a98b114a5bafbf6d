//! Daily mood entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Fixed, ordered mood scale (worst to best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Terrible,
    Bad,
    Neutral,
    Good,
    Great,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Terrible,
        Mood::Bad,
        Mood::Neutral,
        Mood::Good,
        Mood::Great,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Terrible => "terrible",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
            Mood::Great => "great",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "mood".into(),
                value: s.to_string(),
                expected: "terrible, bad, neutral, good, great".into(),
            })
    }
}

/// The mood logged for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// One row of `Ledger::mood_history`; `entry` is `None` for days with no mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodHistoryEntry {
    pub date: NaiveDate,
    pub entry: Option<MoodEntry>,
}

impl MoodHistoryEntry {
    pub fn mood(&self) -> Option<Mood> {
        self.entry.as_ref().map(|e| e.mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Terrible".parse::<Mood>().unwrap(), Mood::Terrible);
        assert_eq!(" great ".parse::<Mood>().unwrap(), Mood::Great);
        assert!("meh".parse::<Mood>().is_err());
    }

    #[test]
    fn scale_is_ordered() {
        assert!(Mood::Terrible < Mood::Bad);
        assert!(Mood::Neutral < Mood::Good);
        assert_eq!(Mood::ALL.iter().max(), Some(&Mood::Great));
    }
}
