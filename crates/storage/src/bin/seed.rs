use std::fmt;

use chrono::{DateTime, Duration, Utc};
use progress_core::model::{
    ActivityEvent, ProgressSettings, QuizId, QuizScorePolicy, TutorialId, UserKey, UserProgress,
};
use storage::repository::{Storage, StorageError};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: String,
    tutorials: u32,
    quizzes: u32,
    days: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidTutorials { raw: String },
    InvalidQuizzes { raw: String },
    InvalidDays { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidTutorials { raw } => write!(f, "invalid --tutorials value: {raw}"),
            ArgsError::InvalidQuizzes { raw } => write!(f, "invalid --quizzes value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("PROGRESS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user =
            std::env::var("PROGRESS_USER").unwrap_or_else(|_| "demo@example.com".into());
        let mut tutorials = std::env::var("PROGRESS_TUTORIALS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut quizzes = std::env::var("PROGRESS_QUIZZES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut days = std::env::var("PROGRESS_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidUser { raw: value });
                    }
                    user = value;
                }
                "--tutorials" => {
                    let value = require_value(&mut args, "--tutorials")?;
                    tutorials = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidTutorials { raw: value.clone() })?;
                }
                "--quizzes" => {
                    let value = require_value(&mut args, "--quizzes")?;
                    quizzes = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidQuizzes { raw: value.clone() })?;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            tutorials,
            quizzes,
            days,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user <key>              User key to seed (default: demo@example.com)");
    eprintln!("  --tutorials <n>           Tutorials to complete (default: 5)");
    eprintln!("  --quizzes <n>             Quizzes to score (default: 3)");
    eprintln!("  --days <n>                Consecutive activity days ending today (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  PROGRESS_DB_URL, PROGRESS_USER, PROGRESS_TUTORIALS, PROGRESS_QUIZZES, PROGRESS_DAYS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let cap = ProgressSettings::default().activity_cap();
    let user = UserKey::new(args.user.clone())?;

    let mut progress = match storage.progress.get(&user).await? {
        Some(existing) => existing,
        None => UserProgress::new(),
    };

    let samples = [
        ("s3-intro", "Intro to S3", "s3", 30),
        ("ec2-basics", "EC2 Basics", "ec2", 45),
        ("lambda-first-steps", "First Steps with Lambda", "lambda", 25),
        ("vpc-networking", "VPC Networking", "vpc", 40),
        ("iam-essentials", "IAM Essentials", "iam", 35),
    ];
    for i in 0..args.tutorials {
        let idx = (i as usize) % samples.len();
        let (slug, title, service_id, minutes) = samples[idx];
        // Spread completions across the requested run of consecutive days.
        let days_ago = i64::from(if args.days == 0 { 0 } else { i % args.days });
        let completed_at = now - Duration::days(days_ago);
        let tutorial_id = TutorialId::new(format!("{slug}-{i}"))?;
        progress.record_tutorial(tutorial_id, title, service_id, minutes, completed_at, cap);
    }

    let topics = ["Networking", "Storage", "Security", "Serverless"];
    for i in 0..args.quizzes {
        let idx = (i as usize) % topics.len();
        let quiz_id = QuizId::new(format!("{}-{i}", topics[idx].to_lowercase()))?;
        let score = 70 + u8::try_from((i * 10) % 31).unwrap_or(0);
        progress.record_quiz_score(quiz_id, score.min(100), QuizScorePolicy::Best);
        progress.push_activity(
            ActivityEvent::quiz(topics[idx], score.min(100), Some(10), now),
            cap,
        );
    }

    progress.recompute_streak(now.date_naive());

    match storage.progress.create(&user, &progress).await {
        Ok(()) => {}
        Err(StorageError::Conflict) => storage.progress.put(&user, &progress).await?,
        Err(err) => return Err(err.into()),
    }

    println!(
        "Seeded user {} with {} tutorials, {} quizzes, streak {} into {}",
        user,
        progress.completed_tutorials().len(),
        progress.quiz_scores().len(),
        progress.learning_streak(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
