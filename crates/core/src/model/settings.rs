use thiserror::Error;

/// Default bound on the recent-activity feed.
pub const DEFAULT_ACTIVITY_CAP: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("activity cap must be at least 1")]
    ZeroActivityCap,
}

/// Policy for upserting a quiz score that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizScorePolicy {
    /// Keep the best score ever achieved. Per-attempt history lives in the
    /// activity feed, so the score map tracks personal bests.
    #[default]
    Best,
    /// Overwrite with the latest attempt.
    Latest,
}

/// Tunables for the progress aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    activity_cap: usize,
    quiz_score_policy: QuizScorePolicy,
}

impl ProgressSettings {
    /// Build settings with an explicit activity cap and score policy.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ZeroActivityCap` if `activity_cap` is 0.
    pub fn new(
        activity_cap: usize,
        quiz_score_policy: QuizScorePolicy,
    ) -> Result<Self, SettingsError> {
        if activity_cap == 0 {
            return Err(SettingsError::ZeroActivityCap);
        }
        Ok(Self {
            activity_cap,
            quiz_score_policy,
        })
    }

    /// Maximum number of entries retained in the recent-activity feed.
    #[must_use]
    pub fn activity_cap(&self) -> usize {
        self.activity_cap
    }

    #[must_use]
    pub fn quiz_score_policy(&self) -> QuizScorePolicy {
        self.quiz_score_policy
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            activity_cap: DEFAULT_ACTIVITY_CAP,
            quiz_score_policy: QuizScorePolicy::default(),
        }
    }
}
