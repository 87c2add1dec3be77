use thiserror::Error;

use crate::model::ids::{IdError, QuizId, TopicId, TutorialId};
use crate::model::patch::ProgressPatch;

/// Errors produced while validating a learning event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("quiz score must be between 0 and 100, got {provided}")]
    ScoreOutOfRange { provided: u8 },

    #[error("a quiz attempt needs at least one question")]
    NoQuestions,

    #[error("learning time must be at least one minute")]
    ZeroMinutes,
}

fn non_empty(raw: impl Into<String>, field: &'static str) -> Result<String, EventError> {
    let value = raw.into().trim().to_string();
    if value.is_empty() {
        return Err(EventError::EmptyField { field });
    }
    Ok(value)
}

fn score_in_range(score: u8) -> Result<u8, EventError> {
    if score > 100 {
        return Err(EventError::ScoreOutOfRange { provided: score });
    }
    Ok(score)
}

/// A validated learning event, tagged by kind.
///
/// Request payloads are converted into this type at the boundary, so the
/// aggregator itself only ever sees well-formed input. Construct variants
/// through the validating constructors rather than literally.
#[derive(Debug, Clone, PartialEq)]
pub enum LearningEvent {
    TutorialCompleted {
        tutorial_id: TutorialId,
        title: String,
        service_id: String,
        estimated_minutes: u32,
    },
    FlashcardsCompleted {
        topic_id: TopicId,
        topic_name: String,
        card_count: u32,
    },
    QuizScored {
        quiz_id: QuizId,
        score: u8,
    },
    QuizActivity {
        category: String,
        score: u8,
        total_questions: u32,
    },
    TimeAdded {
        minutes: u32,
    },
    ProgressPatched(ProgressPatch),
}

impl LearningEvent {
    /// Validated tutorial completion.
    ///
    /// # Errors
    ///
    /// Returns `EventError` for an empty tutorial id, title, or service id.
    pub fn tutorial_completed(
        tutorial_id: impl Into<String>,
        title: impl Into<String>,
        service_id: impl Into<String>,
        estimated_minutes: u32,
    ) -> Result<Self, EventError> {
        Ok(Self::TutorialCompleted {
            tutorial_id: TutorialId::new(tutorial_id)?,
            title: non_empty(title, "title")?,
            service_id: non_empty(service_id, "service id")?,
            estimated_minutes,
        })
    }

    /// Validated flashcard-topic completion.
    ///
    /// # Errors
    ///
    /// Returns `EventError` for an empty topic id or topic name.
    pub fn flashcards_completed(
        topic_id: impl Into<String>,
        topic_name: impl Into<String>,
        card_count: u32,
    ) -> Result<Self, EventError> {
        Ok(Self::FlashcardsCompleted {
            topic_id: TopicId::new(topic_id)?,
            topic_name: non_empty(topic_name, "topic name")?,
            card_count,
        })
    }

    /// Validated quiz-score upsert.
    ///
    /// # Errors
    ///
    /// Returns `EventError` for an empty quiz id or a score above 100.
    pub fn quiz_scored(quiz_id: impl Into<String>, score: u8) -> Result<Self, EventError> {
        Ok(Self::QuizScored {
            quiz_id: QuizId::new(quiz_id)?,
            score: score_in_range(score)?,
        })
    }

    /// Validated quiz-attempt history record.
    ///
    /// # Errors
    ///
    /// Returns `EventError` for an empty category, a score above 100, or a
    /// zero question count.
    pub fn quiz_activity(
        category: impl Into<String>,
        score: u8,
        total_questions: u32,
    ) -> Result<Self, EventError> {
        if total_questions == 0 {
            return Err(EventError::NoQuestions);
        }
        Ok(Self::QuizActivity {
            category: non_empty(category, "category")?,
            score: score_in_range(score)?,
            total_questions,
        })
    }

    /// Validated manual time credit.
    ///
    /// # Errors
    ///
    /// Returns `EventError::ZeroMinutes` for a zero-minute credit.
    pub fn time_added(minutes: u32) -> Result<Self, EventError> {
        if minutes == 0 {
            return Err(EventError::ZeroMinutes);
        }
        Ok(Self::TimeAdded { minutes })
    }

    /// Validated merge patch.
    ///
    /// # Errors
    ///
    /// Returns `EventError` if the patch carries out-of-range scores.
    pub fn progress_patched(patch: ProgressPatch) -> Result<Self, EventError> {
        patch.validate()?;
        Ok(Self::ProgressPatched(patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_event_validates_fields() {
        let event =
            LearningEvent::tutorial_completed("s3-intro", "Intro to S3", "s3", 30).unwrap();
        assert!(matches!(
            event,
            LearningEvent::TutorialCompleted { estimated_minutes: 30, .. }
        ));

        let err = LearningEvent::tutorial_completed("s3-intro", "  ", "s3", 30).unwrap_err();
        assert!(matches!(err, EventError::EmptyField { field: "title" }));
    }

    #[test]
    fn empty_tutorial_id_surfaces_id_error() {
        let err = LearningEvent::tutorial_completed("", "Intro", "s3", 30).unwrap_err();
        assert!(matches!(err, EventError::Id(_)));
    }

    #[test]
    fn quiz_score_above_hundred_is_rejected() {
        let err = LearningEvent::quiz_scored("networking", 101).unwrap_err();
        assert!(matches!(err, EventError::ScoreOutOfRange { provided: 101 }));
        assert!(LearningEvent::quiz_scored("networking", 100).is_ok());
    }

    #[test]
    fn quiz_activity_needs_questions() {
        let err = LearningEvent::quiz_activity("Networking", 80, 0).unwrap_err();
        assert!(matches!(err, EventError::NoQuestions));
    }

    #[test]
    fn zero_minute_credit_is_rejected() {
        let err = LearningEvent::time_added(0).unwrap_err();
        assert!(matches!(err, EventError::ZeroMinutes));
        assert!(LearningEvent::time_added(1).is_ok());
    }
}
