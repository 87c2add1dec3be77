use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of recorded learning activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Tutorial,
    Flashcards,
    Quiz,
}

/// One timestamped entry in a user's activity feed.
///
/// Feeds both the recent-activity display and the streak computation. Quiz
/// attempts optionally carry their score and question count; tutorial and
/// flashcard entries carry only a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Entry for a completed tutorial.
    #[must_use]
    pub fn tutorial(title: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind: ActivityKind::Tutorial,
            label: title.into(),
            score: None,
            total_questions: None,
            occurred_at,
        }
    }

    /// Entry for a completed flashcard topic.
    #[must_use]
    pub fn flashcards(topic_name: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind: ActivityKind::Flashcards,
            label: topic_name.into(),
            score: None,
            total_questions: None,
            occurred_at,
        }
    }

    /// Entry for a quiz attempt.
    #[must_use]
    pub fn quiz(
        label: impl Into<String>,
        score: u8,
        total_questions: Option<u32>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: ActivityKind::Quiz,
            label: label.into(),
            score: Some(score),
            total_questions,
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn quiz_entry_carries_score_and_questions() {
        let event = ActivityEvent::quiz("Networking", 80, Some(10), fixed_now());
        assert_eq!(event.kind, ActivityKind::Quiz);
        assert_eq!(event.score, Some(80));
        assert_eq!(event.total_questions, Some(10));
    }

    #[test]
    fn tutorial_entry_has_no_score_fields_in_json() {
        let event = ActivityEvent::tutorial("Intro to S3", fixed_now());
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("score"));
        let back: ActivityEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
