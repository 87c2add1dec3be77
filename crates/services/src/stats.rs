use chrono::{DateTime, Utc};

use progress_core::model::UserProgress;

/// Read-only summary of a user's learning progress, for display.
///
/// A pure projection over the progress document; no field here is stored.
/// `Default` is the zero-valued summary substituted when no record exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressStats {
    pub total_tutorials: usize,
    pub total_flashcard_sets: usize,
    pub total_quizzes: usize,
    pub average_quiz_score: f64,
    pub total_time_minutes: u32,
    pub learning_streak: u32,
    pub achievements_unlocked: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ProgressStats {
    /// Project the summary from a progress document.
    #[must_use]
    pub fn from_progress(progress: &UserProgress) -> Self {
        let scores = progress.quiz_scores();
        let average_quiz_score = if scores.is_empty() {
            0.0
        } else {
            let sum: u32 = scores.values().map(|&score| u32::from(score)).sum();
            f64::from(sum) / scores.len() as f64
        };

        Self {
            total_tutorials: progress.completed_tutorials().len(),
            total_flashcard_sets: progress.completed_flashcard_sets().len(),
            total_quizzes: scores.len(),
            average_quiz_score,
            total_time_minutes: progress.total_time_minutes(),
            learning_streak: progress.learning_streak(),
            achievements_unlocked: progress.achievements().len(),
            last_activity: progress.last_activity(),
        }
    }
}
