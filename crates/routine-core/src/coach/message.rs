//! Coach transcript and feedback messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::PenaltyTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    User,
}

/// Category of a coach-authored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Feedback,
    Penalty,
    Stoic,
    Reminder,
}

/// Where a coach reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyIntensity {
    High,
    Medium,
    Mental,
    Schedule,
}

/// Penalty attached to a `penalty` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub task: String,
    pub intensity: PenaltyIntensity,
    pub duration: String,
}

impl From<&PenaltyTask> for Penalty {
    fn from(p: &PenaltyTask) -> Self {
        Self {
            task: p.task.to_string(),
            intensity: p.intensity,
            duration: p.duration.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachMessage {
    pub role: Role,
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<Penalty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl CoachMessage {
    fn coach(kind: MessageKind, content: String) -> Self {
        Self {
            role: Role::Coach,
            content,
            kind: Some(kind),
            penalty: None,
            timestamp: None,
            source: None,
        }
    }

    pub fn feedback(content: impl Into<String>) -> Self {
        Self::coach(MessageKind::Feedback, content.into())
    }

    pub fn penalty(content: impl Into<String>, penalty: Penalty) -> Self {
        Self {
            penalty: Some(penalty),
            ..Self::coach(MessageKind::Penalty, content.into())
        }
    }

    pub fn stoic(content: impl Into<String>) -> Self {
        Self::coach(MessageKind::Stoic, content.into())
    }

    pub fn reminder(content: impl Into<String>) -> Self {
        Self::coach(MessageKind::Reminder, content.into())
    }

    /// A transcript entry typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: None,
            penalty: None,
            timestamp: Some(Utc::now()),
            source: None,
        }
    }

    /// A coach reply in the chat transcript.
    pub fn reply(content: impl Into<String>, source: Source) -> Self {
        Self {
            role: Role::Coach,
            content: content.into(),
            kind: None,
            penalty: None,
            timestamp: Some(Utc::now()),
            source: Some(source),
        }
    }

    pub(crate) fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_message_json_shape() {
        let msg = CoachMessage::penalty(
            "Penalty: 50 burpees. Now.",
            Penalty {
                task: "50 burpees. Now.".into(),
                intensity: PenaltyIntensity::High,
                duration: "10 min".into(),
            },
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "coach");
        assert_eq!(json["type"], "penalty");
        assert_eq!(json["penalty"]["intensity"], "high");
        assert!(json.get("source").is_none());
    }

    #[test]
    fn user_entry_has_timestamp_and_no_type() {
        let msg = CoachMessage::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("type").is_none());
        assert!(msg.timestamp.is_some());
    }
}
