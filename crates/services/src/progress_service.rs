use std::sync::Arc;

use progress_core::Clock;
use progress_core::achievements::{self, AchievementRule};
use progress_core::model::{
    ActivityEvent, LearningEvent, ProgressPatch, ProgressSettings, UserKey, UserProgress,
};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;
use crate::stats::ProgressStats;

/// Records learning events against a user's progress document and derives
/// its summary statistics.
///
/// Every recording operation is one read-modify-write cycle against the
/// document store: fetch the current document, mutate it in memory, write it
/// back. The store offers per-item atomicity only, so two concurrent calls
/// for the same user are last-write-wins; this is the documented baseline
/// contract (eventual, not linearizable, consistency per user). Construct
/// once per process and share behind `Arc` across request handlers.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    settings: ProgressSettings,
    rules: Vec<AchievementRule>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    /// Create a service with default settings and the stock achievement
    /// rule set.
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            settings: ProgressSettings::default(),
            rules: achievements::default_rules(),
            progress,
        }
    }

    /// Override the aggregator settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ProgressSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the achievement rule set.
    #[must_use]
    pub fn with_achievement_rules(mut self, rules: Vec<AchievementRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Create the zero-valued progress record for a newly confirmed account.
    ///
    /// Invoked once per user by the account-confirmation flow.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` with a conflict if the record
    /// already exists, or if the store cannot be written.
    pub async fn initialize_user(&self, key: &UserKey) -> Result<(), ProgressServiceError> {
        self.progress.create(key, &UserProgress::new()).await?;
        tracing::info!(user = %key, "progress record initialized");
        Ok(())
    }

    /// Record a tutorial completion. Idempotent on the tutorial id: a repeat
    /// completion succeeds without crediting time twice.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the user has
    /// no progress record, `Storage` on persistence failure.
    pub async fn complete_tutorial(
        &self,
        key: &UserKey,
        tutorial_id: &str,
        title: &str,
        service_id: &str,
        estimated_minutes: u32,
    ) -> Result<(), ProgressServiceError> {
        let event =
            LearningEvent::tutorial_completed(tutorial_id, title, service_id, estimated_minutes)?;
        self.record(key, event).await
    }

    /// Record a flashcard-topic completion. Idempotent on the topic id.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the user has
    /// no progress record, `Storage` on persistence failure.
    pub async fn complete_flashcards(
        &self,
        key: &UserKey,
        topic_id: &str,
        topic_name: &str,
        card_count: u32,
    ) -> Result<(), ProgressServiceError> {
        let event = LearningEvent::flashcards_completed(topic_id, topic_name, card_count)?;
        self.record(key, event).await
    }

    /// Upsert a quiz score per the configured policy (best score by
    /// default).
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the user has
    /// no progress record, `Storage` on persistence failure.
    pub async fn update_quiz_score(
        &self,
        key: &UserKey,
        quiz_id: &str,
        score: u8,
    ) -> Result<(), ProgressServiceError> {
        let event = LearningEvent::quiz_scored(quiz_id, score)?;
        self.record(key, event).await
    }

    /// Record a quiz attempt in the activity history, independent of the
    /// best-score tracking of [`ProgressService::update_quiz_score`].
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the user has
    /// no progress record, `Storage` on persistence failure.
    pub async fn add_quiz_activity(
        &self,
        key: &UserKey,
        category: &str,
        score: u8,
        total_questions: u32,
    ) -> Result<(), ProgressServiceError> {
        let event = LearningEvent::quiz_activity(category, score, total_questions)?;
        self.record(key, event).await
    }

    /// Credit ambient learning minutes. Updates the last-activity timestamp
    /// but records no activity entry and leaves the streak untouched.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero-minute credit, `NotFound` if the user
    /// has no progress record, `Storage` on persistence failure.
    pub async fn add_learning_time(
        &self,
        key: &UserKey,
        minutes: u32,
    ) -> Result<(), ProgressServiceError> {
        let event = LearningEvent::time_added(minutes)?;
        self.record(key, event).await
    }

    /// Merge a field-wise patch into the stored document, last-write-wins
    /// per field. The streak is recomputed afterwards rather than patched.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for out-of-range patched scores, `NotFound` if
    /// the user has no progress record, `Storage` on persistence failure.
    pub async fn update_progress(
        &self,
        key: &UserKey,
        patch: ProgressPatch,
    ) -> Result<(), ProgressServiceError> {
        let event = LearningEvent::progress_patched(patch)?;
        self.record(key, event).await
    }

    /// Record a validated learning event.
    ///
    /// The named operations above are validating wrappers around this
    /// dispatch path.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no progress record, `Storage` on
    /// persistence failure.
    pub async fn record(
        &self,
        key: &UserKey,
        event: LearningEvent,
    ) -> Result<(), ProgressServiceError> {
        let mut progress = self.load(key).await?;
        self.apply(key, &mut progress, event);
        self.progress.put(key, &progress).await?;
        Ok(())
    }

    /// Summary statistics for a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no progress record, `Storage` if
    /// the store cannot be read.
    pub async fn stats(&self, key: &UserKey) -> Result<ProgressStats, ProgressServiceError> {
        let progress = self.load(key).await?;
        Ok(ProgressStats::from_progress(&progress))
    }

    /// Summary statistics, substituting the zero-valued projection when no
    /// record exists. For callers that must never surface `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read.
    pub async fn stats_or_default(
        &self,
        key: &UserKey,
    ) -> Result<ProgressStats, ProgressServiceError> {
        match self.stats(key).await {
            Ok(stats) => Ok(stats),
            Err(ProgressServiceError::NotFound) => Ok(ProgressStats::default()),
            Err(err) => Err(err),
        }
    }

    fn apply(&self, key: &UserKey, progress: &mut UserProgress, event: LearningEvent) {
        let now = self.clock.now();
        let today = now.date_naive();
        let cap = self.settings.activity_cap();

        match event {
            LearningEvent::TutorialCompleted {
                tutorial_id,
                title,
                service_id,
                estimated_minutes,
            } => {
                let recorded = progress.record_tutorial(
                    tutorial_id.clone(),
                    title,
                    service_id,
                    estimated_minutes,
                    now,
                    cap,
                );
                if recorded {
                    progress.recompute_streak(today);
                } else {
                    tracing::debug!(user = %key, tutorial = %tutorial_id, "tutorial already completed, skipping");
                }
            }
            LearningEvent::FlashcardsCompleted {
                topic_id,
                topic_name,
                card_count,
            } => {
                let recorded =
                    progress.record_flashcards(topic_id.clone(), topic_name, card_count, now, cap);
                if recorded {
                    progress.recompute_streak(today);
                } else {
                    tracing::debug!(user = %key, topic = %topic_id, "topic already completed, skipping");
                }
            }
            LearningEvent::QuizScored { quiz_id, score } => {
                let stored = progress.record_quiz_score(
                    quiz_id.clone(),
                    score,
                    self.settings.quiz_score_policy(),
                );
                progress.push_activity(ActivityEvent::quiz(quiz_id.as_str(), score, None, now), cap);
                progress.recompute_streak(today);
                tracing::debug!(user = %key, quiz = %quiz_id, score, stored, "quiz score recorded");
            }
            LearningEvent::QuizActivity {
                category,
                score,
                total_questions,
            } => {
                progress.push_activity(
                    ActivityEvent::quiz(category, score, Some(total_questions), now),
                    cap,
                );
                progress.recompute_streak(today);
            }
            LearningEvent::TimeAdded { minutes } => {
                progress.add_time(minutes, now);
            }
            LearningEvent::ProgressPatched(patch) => {
                progress.apply_patch(patch, cap);
                progress.recompute_streak(today);
            }
        }

        let unlocked = achievements::evaluate(&self.rules, progress);
        if !unlocked.is_empty() {
            tracing::info!(user = %key, ?unlocked, "achievements unlocked");
        }
    }

    async fn load(&self, key: &UserKey) -> Result<UserProgress, ProgressServiceError> {
        self.progress
            .get(key)
            .await?
            .ok_or(ProgressServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, StorageError};

    fn key() -> UserKey {
        UserKey::new("ada@example.com").unwrap()
    }

    fn service(repo: &InMemoryRepository) -> ProgressService {
        ProgressService::new(fixed_clock(), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn recording_against_missing_user_is_not_found() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let err = svc
            .complete_tutorial(&key(), "s3-intro", "Intro to S3", "s3", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::NotFound));
    }

    #[tokio::test]
    async fn second_initialize_conflicts() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.initialize_user(&key()).await.unwrap();

        let err = svc.initialize_user(&key()).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressServiceError::Storage(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn repeat_completion_does_not_double_credit() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.initialize_user(&key()).await.unwrap();

        svc.complete_tutorial(&key(), "s3-intro", "Intro to S3", "s3", 30)
            .await
            .unwrap();
        svc.complete_tutorial(&key(), "s3-intro", "Intro to S3", "s3", 30)
            .await
            .unwrap();

        let stats = svc.stats(&key()).await.unwrap();
        assert_eq!(stats.total_tutorials, 1);
        assert_eq!(stats.total_time_minutes, 30);
    }

    #[tokio::test]
    async fn validation_errors_surface_before_any_read() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let err = svc
            .update_quiz_score(&key(), "networking", 120)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn ambient_time_leaves_the_streak_alone() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.initialize_user(&key()).await.unwrap();

        svc.add_learning_time(&key(), 45).await.unwrap();

        let stats = svc.stats(&key()).await.unwrap();
        assert_eq!(stats.total_time_minutes, 45);
        assert_eq!(stats.learning_streak, 0);
        assert_eq!(stats.last_activity, Some(fixed_now()));
    }

    #[tokio::test]
    async fn stats_or_default_masks_not_found() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let stats = svc.stats_or_default(&key()).await.unwrap();
        assert_eq!(stats, ProgressStats::default());
    }
}
