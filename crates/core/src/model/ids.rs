use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for identifier validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} must not be empty")]
pub struct IdError {
    kind: &'static str,
}

impl IdError {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

fn validated(raw: impl Into<String>, kind: &'static str) -> Result<String, IdError> {
    let value = raw.into().trim().to_string();
    if value.is_empty() {
        return Err(IdError::new(kind));
    }
    Ok(value)
}

/// Stable key for one user's progress record.
///
/// Produced by identity resolution (typically the verified email address);
/// this crate only requires it to be a non-empty string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Creates a `UserKey`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self(validated(raw, "user key")?))
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a tutorial.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorialId(String);

impl TutorialId {
    /// Creates a `TutorialId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self(validated(raw, "tutorial id")?))
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a flashcard topic.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Creates a `TopicId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self(validated(raw, "topic id")?))
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a quiz.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Creates a `QuizId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        Ok(Self(validated(raw, "quiz id")?))
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserKey({})", self.0)
    }
}

impl fmt::Debug for TutorialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TutorialId({})", self.0)
    }
}

impl fmt::Debug for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicId({})", self.0)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TutorialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_trims_whitespace() {
        let key = UserKey::new("  ada@example.com  ").unwrap();
        assert_eq!(key.as_str(), "ada@example.com");
    }

    #[test]
    fn empty_user_key_is_rejected() {
        let err = UserKey::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "user key must not be empty");
    }

    #[test]
    fn tutorial_id_display_matches_value() {
        let id = TutorialId::new("s3-intro").unwrap();
        assert_eq!(id.to_string(), "s3-intro");
    }

    #[test]
    fn empty_tutorial_id_is_rejected() {
        assert!(TutorialId::new("").is_err());
    }

    #[test]
    fn topic_id_equality_uses_trimmed_value() {
        let a = TopicId::new("ec2-basics").unwrap();
        let b = TopicId::new(" ec2-basics ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn quiz_id_roundtrips_through_serde() {
        let id = QuizId::new("networking-101").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"networking-101\"");
        let back: QuizId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
