use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::achievements::AchievementId;
use crate::model::activity::ActivityEvent;
use crate::model::event::EventError;
use crate::model::ids::QuizId;
use crate::model::progress::{CompletedFlashcardSet, CompletedTutorial};

/// Field-wise merge patch for a progress document.
///
/// Used by lower-trust call sites: only the known schema fields are
/// representable, and deserialization rejects unknown keys outright
/// (`deny_unknown_fields`), so nothing foreign can be written through to the
/// store. Unset fields leave the stored value untouched; set fields replace
/// it wholesale (last write wins).
///
/// The learning streak is deliberately absent: it is a derived projection
/// and is recomputed after every patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressPatch {
    pub completed_tutorials: Option<Vec<CompletedTutorial>>,
    pub completed_flashcard_sets: Option<Vec<CompletedFlashcardSet>>,
    pub quiz_scores: Option<BTreeMap<QuizId, u8>>,
    pub recent_activity: Option<Vec<ActivityEvent>>,
    pub total_time_minutes: Option<u32>,
    pub achievements: Option<BTreeSet<AchievementId>>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ProgressPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check value ranges the schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns `EventError::ScoreOutOfRange` if any patched quiz score or
    /// activity score exceeds 100.
    pub fn validate(&self) -> Result<(), EventError> {
        if let Some(scores) = &self.quiz_scores {
            for &score in scores.values() {
                if score > 100 {
                    return Err(EventError::ScoreOutOfRange { provided: score });
                }
            }
        }
        if let Some(feed) = &self.recent_activity {
            for event in feed {
                if let Some(score) = event.score {
                    if score > 100 {
                        return Err(EventError::ScoreOutOfRange { provided: score });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"total_time_minutes": 10, "is_admin": true}"#;
        let parsed: Result<ProgressPatch, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn known_fields_deserialize() {
        let raw = r#"{"total_time_minutes": 45}"#;
        let patch: ProgressPatch = serde_json::from_str(raw).unwrap();
        assert_eq!(patch.total_time_minutes, Some(45));
        assert!(patch.quiz_scores.is_none());
    }

    #[test]
    fn streak_is_not_patchable() {
        let raw = r#"{"learning_streak": 999}"#;
        let parsed: Result<ProgressPatch, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_patched_score_fails_validation() {
        let mut scores = BTreeMap::new();
        scores.insert(QuizId::new("networking").unwrap(), 150_u8);
        let patch = ProgressPatch {
            quiz_scores: Some(scores),
            ..ProgressPatch::default()
        };
        let err = patch.validate().unwrap_err();
        assert!(matches!(err, EventError::ScoreOutOfRange { provided: 150 }));
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(ProgressPatch::default().is_empty());
        let patch = ProgressPatch {
            total_time_minutes: Some(1),
            ..ProgressPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
