//! Threshold-based achievement rules.
//!
//! Achievements are a pluggable rule list evaluated against the progress
//! document after every recorded event. Unlocking is monotonic: once an
//! identifier enters the set it is never removed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::UserProgress;

/// Identifier for an unlocked achievement.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

impl AchievementId {
    /// Creates a new `AchievementId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AchievementId({})", self.0)
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Threshold that unlocks an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Criterion {
    /// At least this many distinct tutorials completed.
    TutorialsCompleted(u32),
    /// At least this many distinct flashcard topics completed.
    FlashcardSetsCompleted(u32),
    /// At least this many distinct quizzes scored.
    QuizzesTaken(u32),
    /// Any quiz scored at 100.
    PerfectQuizScore,
    /// Learning streak of at least this many days.
    StreakDays(u32),
    /// At least this many total minutes of learning time.
    TotalMinutes(u32),
}

/// One achievement rule: an identifier plus the threshold that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementRule {
    id: AchievementId,
    criterion: Criterion,
}

impl AchievementRule {
    #[must_use]
    pub fn new(id: impl Into<String>, criterion: Criterion) -> Self {
        Self {
            id: AchievementId::new(id),
            criterion,
        }
    }

    #[must_use]
    pub fn id(&self) -> &AchievementId {
        &self.id
    }

    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Whether the progress document meets this rule's threshold.
    #[must_use]
    pub fn is_met(&self, progress: &UserProgress) -> bool {
        match self.criterion {
            Criterion::TutorialsCompleted(n) => {
                progress.completed_tutorials().len() >= n as usize
            }
            Criterion::FlashcardSetsCompleted(n) => {
                progress.completed_flashcard_sets().len() >= n as usize
            }
            Criterion::QuizzesTaken(n) => progress.quiz_scores().len() >= n as usize,
            Criterion::PerfectQuizScore => {
                progress.quiz_scores().values().any(|&score| score == 100)
            }
            Criterion::StreakDays(n) => progress.learning_streak() >= n,
            Criterion::TotalMinutes(n) => progress.total_time_minutes() >= n,
        }
    }
}

/// The rule set shipped with the platform.
#[must_use]
pub fn default_rules() -> Vec<AchievementRule> {
    vec![
        AchievementRule::new("first-tutorial", Criterion::TutorialsCompleted(1)),
        AchievementRule::new("tutorial-explorer", Criterion::TutorialsCompleted(10)),
        AchievementRule::new("flashcard-five", Criterion::FlashcardSetsCompleted(5)),
        AchievementRule::new("quiz-taker", Criterion::QuizzesTaken(1)),
        AchievementRule::new("quiz-regular", Criterion::QuizzesTaken(10)),
        AchievementRule::new("perfect-score", Criterion::PerfectQuizScore),
        AchievementRule::new("week-streak", Criterion::StreakDays(7)),
        AchievementRule::new("ten-hours", Criterion::TotalMinutes(600)),
    ]
}

/// Unlock every rule the document now satisfies; returns the newly unlocked
/// identifiers in rule order.
pub fn evaluate(rules: &[AchievementRule], progress: &mut UserProgress) -> Vec<AchievementId> {
    let mut unlocked = Vec::new();
    for rule in rules {
        if rule.is_met(progress) && progress.unlock(rule.id().clone()) {
            unlocked.push(rule.id().clone());
        }
    }
    unlocked
}
