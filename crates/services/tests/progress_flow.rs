use std::sync::Arc;

use chrono::Duration;
use progress_core::model::{ProgressPatch, ProgressSettings, QuizScorePolicy, UserKey};
use progress_core::time::fixed_now;
use services::{Clock, ProgressService};
use storage::repository::InMemoryRepository;

fn key() -> UserKey {
    UserKey::new("ada@example.com").unwrap()
}

fn service_at(repo: &InMemoryRepository, clock: Clock) -> ProgressService {
    ProgressService::new(clock, Arc::new(repo.clone()))
}

#[tokio::test]
async fn streak_grows_over_consecutive_days() {
    let repo = InMemoryRepository::new();
    let now = fixed_now();

    service_at(&repo, Clock::fixed(now))
        .initialize_user(&key())
        .await
        .unwrap();

    // One tutorial per day, two days ago through today.
    for days_back in (0..3_i64).rev() {
        let svc = service_at(&repo, Clock::fixed(now - Duration::days(days_back)));
        svc.complete_tutorial(
            &key(),
            &format!("tutorial-{days_back}"),
            "Daily tutorial",
            "s3",
            20,
        )
        .await
        .unwrap();
    }

    let stats = service_at(&repo, Clock::fixed(now))
        .stats(&key())
        .await
        .unwrap();
    assert_eq!(stats.learning_streak, 3);
    assert_eq!(stats.total_tutorials, 3);
    assert_eq!(stats.total_time_minutes, 60);
}

#[tokio::test]
async fn gap_resets_the_streak_on_next_recording() {
    let repo = InMemoryRepository::new();
    let now = fixed_now();

    service_at(&repo, Clock::fixed(now - Duration::days(4)))
        .initialize_user(&key())
        .await
        .unwrap();
    service_at(&repo, Clock::fixed(now - Duration::days(4)))
        .complete_tutorial(&key(), "old-tutorial", "Old", "ec2", 10)
        .await
        .unwrap();

    // Nothing for three days; the next recording starts a fresh streak.
    let svc = service_at(&repo, Clock::fixed(now));
    svc.add_quiz_activity(&key(), "Networking", 70, 10)
        .await
        .unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert_eq!(stats.learning_streak, 1);
}

#[tokio::test]
async fn best_score_policy_is_the_default() {
    let repo = InMemoryRepository::new();
    let svc = service_at(&repo, Clock::fixed(fixed_now()));
    svc.initialize_user(&key()).await.unwrap();

    svc.update_quiz_score(&key(), "networking", 80).await.unwrap();
    svc.update_quiz_score(&key(), "networking", 60).await.unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert_eq!(stats.total_quizzes, 1);
    assert!((stats.average_quiz_score - 80.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn latest_score_policy_overwrites() {
    let repo = InMemoryRepository::new();
    let settings = ProgressSettings::new(50, QuizScorePolicy::Latest).unwrap();
    let svc = service_at(&repo, Clock::fixed(fixed_now())).with_settings(settings);
    svc.initialize_user(&key()).await.unwrap();

    svc.update_quiz_score(&key(), "networking", 80).await.unwrap();
    svc.update_quiz_score(&key(), "networking", 60).await.unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert!((stats.average_quiz_score - 60.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn quiz_activity_is_history_not_score_tracking() {
    let repo = InMemoryRepository::new();
    let svc = service_at(&repo, Clock::fixed(fixed_now()));
    svc.initialize_user(&key()).await.unwrap();

    svc.add_quiz_activity(&key(), "Serverless", 90, 10)
        .await
        .unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert_eq!(stats.total_quizzes, 0);
    assert_eq!(stats.learning_streak, 1);
}

#[tokio::test]
async fn flashcards_are_idempotent_per_topic() {
    let repo = InMemoryRepository::new();
    let svc = service_at(&repo, Clock::fixed(fixed_now()));
    svc.initialize_user(&key()).await.unwrap();

    svc.complete_flashcards(&key(), "ec2-basics", "EC2 Basics", 12)
        .await
        .unwrap();
    svc.complete_flashcards(&key(), "ec2-basics", "EC2 Basics", 12)
        .await
        .unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert_eq!(stats.total_flashcard_sets, 1);
}

#[tokio::test]
async fn patch_merges_fields_and_recomputes_streak() {
    let repo = InMemoryRepository::new();
    let svc = service_at(&repo, Clock::fixed(fixed_now()));
    svc.initialize_user(&key()).await.unwrap();

    let patch = ProgressPatch {
        total_time_minutes: Some(240),
        ..ProgressPatch::default()
    };
    svc.update_progress(&key(), patch).await.unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    assert_eq!(stats.total_time_minutes, 240);
    assert_eq!(stats.learning_streak, 0);
}

#[tokio::test]
async fn achievements_unlock_as_thresholds_are_crossed() {
    let repo = InMemoryRepository::new();
    let svc = service_at(&repo, Clock::fixed(fixed_now()));
    svc.initialize_user(&key()).await.unwrap();

    svc.complete_tutorial(&key(), "s3-intro", "Intro to S3", "s3", 30)
        .await
        .unwrap();
    svc.update_quiz_score(&key(), "networking", 100)
        .await
        .unwrap();

    let stats = svc.stats(&key()).await.unwrap();
    // first-tutorial, quiz-taker, and perfect-score from the default rules
    assert_eq!(stats.achievements_unlocked, 3);
}
