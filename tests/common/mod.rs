#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use liftchat::clock::ManualClock;
use liftchat::conversation::{CommitMode, ConversationEngine};
use liftchat::db::{create_memory_pool, DbPool};
use liftchat::migrations::run_migrations_for_tests;
use liftchat::models::{Command, Event, Reply};
use liftchat::repositories::WorkoutRepository;
use liftchat::session::SessionStore;

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub struct TestEngine {
    pub engine: Arc<ConversationEngine>,
    pub clock: Arc<ManualClock>,
    pub repo: WorkoutRepository,
}

/// Noon UTC on the given day, so "today" is that date.
pub fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn create_test_engine(pool: DbPool) -> TestEngine {
    create_test_engine_with_mode(pool, CommitMode::PerExercise)
}

pub fn create_test_engine_with_mode(pool: DbPool, commit_mode: CommitMode) -> TestEngine {
    let clock = Arc::new(ManualClock::new(noon(2024, 10, 14)));
    let repo = WorkoutRepository::new(pool);
    let sessions = SessionStore::new(chrono::Duration::minutes(30), clock.clone());
    let engine = Arc::new(ConversationEngine::new(
        repo.clone(),
        sessions,
        clock.clone(),
        commit_mode,
    ));

    TestEngine {
        engine,
        clock,
        repo,
    }
}

impl TestEngine {
    pub async fn text(&self, user_id: i64, text: &str) -> Reply {
        self.engine.handle(Event::text(user_id, text)).await.unwrap()
    }

    pub async fn choose(&self, user_id: i64, command: Command) -> Reply {
        self.engine
            .handle(Event::choice(user_id, command))
            .await
            .unwrap()
    }

    pub fn workout_id(&self, user_id: i64) -> String {
        self.engine
            .sessions()
            .session(user_id)
            .expect("no active session")
            .workout_id
    }

    /// Start a workout and enter one complete exercise, ending in Confirm.
    pub async fn enter_exercise(&self, user_id: i64, name: &str, sets: &str, reps: &str, weight: &str) {
        self.text(user_id, name).await;
        self.text(user_id, sets).await;
        self.text(user_id, reps).await;
        self.text(user_id, weight).await;
    }

    pub async fn record_workout(&self, user_id: i64, exercises: &[(&str, &str, &str, &str)]) {
        self.text(user_id, "/start").await;
        self.choose(user_id, Command::StartWorkout).await;
        for (idx, (name, sets, reps, weight)) in exercises.iter().enumerate() {
            if idx > 0 {
                self.choose(user_id, Command::AddAnother).await;
            }
            self.enter_exercise(user_id, name, sets, reps, weight).await;
        }
        self.choose(user_id, Command::Finish).await;
    }
}

pub fn count_rows(pool: &DbPool, table: &str) -> i64 {
    let conn = pool.get().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
