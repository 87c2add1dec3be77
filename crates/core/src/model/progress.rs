use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::achievements::AchievementId;
use crate::model::activity::ActivityEvent;
use crate::model::ids::{QuizId, TopicId, TutorialId};
use crate::model::patch::ProgressPatch;
use crate::model::settings::QuizScorePolicy;
use crate::streak;

/// Record of one completed tutorial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTutorial {
    pub tutorial_id: TutorialId,
    pub title: String,
    pub service_id: String,
    pub estimated_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

/// Record of one completed flashcard topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedFlashcardSet {
    pub topic_id: TopicId,
    pub topic_name: String,
    pub card_count: u32,
    pub completed_at: DateTime<Utc>,
}

/// Per-user document aggregating all learning activity and derived state.
///
/// `learning_streak` is a cached projection of the activity dates; every
/// mutation that touches the activity history is followed by
/// [`UserProgress::recompute_streak`] so the cache never drifts from what
/// the pure recomputation would produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProgress {
    completed_tutorials: Vec<CompletedTutorial>,
    completed_flashcard_sets: Vec<CompletedFlashcardSet>,
    quiz_scores: BTreeMap<QuizId, u8>,
    recent_activity: Vec<ActivityEvent>,
    learning_streak: u32,
    total_time_minutes: u32,
    achievements: BTreeSet<AchievementId>,
    last_activity: Option<DateTime<Utc>>,
}

impl UserProgress {
    /// The zero-valued document created at account confirmation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn completed_tutorials(&self) -> &[CompletedTutorial] {
        &self.completed_tutorials
    }

    #[must_use]
    pub fn completed_flashcard_sets(&self) -> &[CompletedFlashcardSet] {
        &self.completed_flashcard_sets
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &BTreeMap<QuizId, u8> {
        &self.quiz_scores
    }

    /// The activity feed, newest first.
    #[must_use]
    pub fn recent_activity(&self) -> &[ActivityEvent] {
        &self.recent_activity
    }

    #[must_use]
    pub fn learning_streak(&self) -> u32 {
        self.learning_streak
    }

    #[must_use]
    pub fn total_time_minutes(&self) -> u32 {
        self.total_time_minutes
    }

    #[must_use]
    pub fn achievements(&self) -> &BTreeSet<AchievementId> {
        &self.achievements
    }

    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    #[must_use]
    pub fn has_completed_tutorial(&self, id: &TutorialId) -> bool {
        self.completed_tutorials
            .iter()
            .any(|entry| entry.tutorial_id == *id)
    }

    #[must_use]
    pub fn has_completed_topic(&self, id: &TopicId) -> bool {
        self.completed_flashcard_sets
            .iter()
            .any(|entry| entry.topic_id == *id)
    }

    /// Record a tutorial completion.
    ///
    /// Idempotent on `tutorial_id`: a repeat completion returns `false` and
    /// leaves the document untouched, so no time is credited twice.
    pub fn record_tutorial(
        &mut self,
        tutorial_id: TutorialId,
        title: impl Into<String>,
        service_id: impl Into<String>,
        estimated_minutes: u32,
        at: DateTime<Utc>,
        cap: usize,
    ) -> bool {
        if self.has_completed_tutorial(&tutorial_id) {
            return false;
        }
        let title = title.into();
        self.completed_tutorials.push(CompletedTutorial {
            tutorial_id,
            title: title.clone(),
            service_id: service_id.into(),
            estimated_minutes,
            completed_at: at,
        });
        self.total_time_minutes = self.total_time_minutes.saturating_add(estimated_minutes);
        self.push_activity(ActivityEvent::tutorial(title, at), cap);
        true
    }

    /// Record a flashcard-topic completion.
    ///
    /// Idempotent on `topic_id`, analogous to [`UserProgress::record_tutorial`].
    pub fn record_flashcards(
        &mut self,
        topic_id: TopicId,
        topic_name: impl Into<String>,
        card_count: u32,
        at: DateTime<Utc>,
        cap: usize,
    ) -> bool {
        if self.has_completed_topic(&topic_id) {
            return false;
        }
        let topic_name = topic_name.into();
        self.completed_flashcard_sets.push(CompletedFlashcardSet {
            topic_id,
            topic_name: topic_name.clone(),
            card_count,
            completed_at: at,
        });
        self.push_activity(ActivityEvent::flashcards(topic_name, at), cap);
        true
    }

    /// Upsert a quiz score according to the policy; returns the stored value.
    pub fn record_quiz_score(
        &mut self,
        quiz_id: QuizId,
        score: u8,
        policy: QuizScorePolicy,
    ) -> u8 {
        let stored = self
            .quiz_scores
            .entry(quiz_id)
            .and_modify(|existing| match policy {
                QuizScorePolicy::Best => *existing = (*existing).max(score),
                QuizScorePolicy::Latest => *existing = score,
            })
            .or_insert(score);
        *stored
    }

    /// Credit ambient learning minutes without an activity entry.
    pub fn add_time(&mut self, minutes: u32, at: DateTime<Utc>) {
        self.total_time_minutes = self.total_time_minutes.saturating_add(minutes);
        self.touch(at);
    }

    /// Insert an activity entry keeping newest-first order, evicting the
    /// oldest entries beyond `cap`.
    pub fn push_activity(&mut self, event: ActivityEvent, cap: usize) {
        self.touch(event.occurred_at);
        let pos = self
            .recent_activity
            .iter()
            .position(|existing| existing.occurred_at <= event.occurred_at)
            .unwrap_or(self.recent_activity.len());
        self.recent_activity.insert(pos, event);
        self.recent_activity.truncate(cap);
    }

    /// Distinct UTC calendar days with recorded activity.
    ///
    /// Drawn from tutorial completions, flashcard completions, and the
    /// activity feed; these are the inputs to the streak computation.
    #[must_use]
    pub fn activity_days(&self) -> BTreeSet<NaiveDate> {
        let tutorials = self
            .completed_tutorials
            .iter()
            .map(|entry| entry.completed_at.date_naive());
        let flashcards = self
            .completed_flashcard_sets
            .iter()
            .map(|entry| entry.completed_at.date_naive());
        let activity = self
            .recent_activity
            .iter()
            .map(|event| event.occurred_at.date_naive());
        tutorials.chain(flashcards).chain(activity).collect()
    }

    /// Re-derive the cached streak from the activity history.
    pub fn recompute_streak(&mut self, today: NaiveDate) {
        self.learning_streak = streak::consecutive_days(today, &self.activity_days());
    }

    /// Add an achievement to the unlocked set; returns `false` if it was
    /// already present.
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        self.achievements.insert(id)
    }

    /// Merge a patch into the document, last-write-wins per field.
    ///
    /// The activity bound and newest-first order are re-enforced after the
    /// feed is replaced. The streak is not part of the patch surface; callers
    /// recompute it afterwards.
    pub fn apply_patch(&mut self, patch: ProgressPatch, cap: usize) {
        if let Some(tutorials) = patch.completed_tutorials {
            self.completed_tutorials = tutorials;
        }
        if let Some(sets) = patch.completed_flashcard_sets {
            self.completed_flashcard_sets = sets;
        }
        if let Some(scores) = patch.quiz_scores {
            self.quiz_scores = scores;
        }
        if let Some(mut feed) = patch.recent_activity {
            feed.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
            feed.truncate(cap);
            self.recent_activity = feed;
        }
        if let Some(minutes) = patch.total_time_minutes {
            self.total_time_minutes = minutes;
        }
        if let Some(achievements) = patch.achievements {
            self.achievements = achievements;
        }
        if let Some(at) = patch.last_activity {
            self.last_activity = Some(at);
        }
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        if self.last_activity.is_none_or(|prev| prev < at) {
            self.last_activity = Some(at);
        }
    }
}
