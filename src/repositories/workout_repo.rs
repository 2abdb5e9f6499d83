use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{CompletedExercise, Exercise, ExerciseLine, FromSqliteRow, Workout, WorkoutSummary};

#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_workout(
        &self,
        user_id: i64,
        date: NaiveDate,
        weekday: &str,
    ) -> Result<Workout> {
        let workout = Workout {
            id: Uuid::new_v4().to_string(),
            user_id,
            date,
            weekday: weekday.to_string(),
            created_at: Utc::now(),
        };
        let workout_clone = workout.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workouts (id, user_id, date, weekday, created_at) VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    workout_clone.id,
                    workout_clone.user_id,
                    workout_clone.date,
                    workout_clone.weekday,
                    workout_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        tracing::debug!(workout_id = %workout.id, user_id, "workout created");
        Ok(workout)
    }

    /// Insert one exercise. Fails with [`AppError::Referential`] when the
    /// workout row is missing.
    pub async fn add_exercise(
        &self,
        workout_id: &str,
        name: &str,
        sets: u32,
        reps: u32,
        weight: f64,
    ) -> Result<Exercise> {
        let exercise = CompletedExercise {
            name: name.to_string(),
            sets,
            reps,
            weight,
        };
        let mut inserted = self
            .add_exercises(workout_id, std::slice::from_ref(&exercise))
            .await?;
        inserted
            .pop()
            .ok_or_else(|| AppError::Internal("exercise insert returned no row".to_string()))
    }

    /// Insert all exercises of a workout in a single transaction.
    pub async fn add_exercises(
        &self,
        workout_id: &str,
        exercises: &[CompletedExercise],
    ) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        let workout_id = workout_id.to_string();
        let exercises = exercises.to_vec();

        tokio::task::spawn_blocking(move || -> Result<Vec<Exercise>> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;

            if !workout_exists(&tx, &workout_id)? {
                return Err(AppError::Referential(workout_id));
            }

            let now = Utc::now();
            let inserted = exercises
                .iter()
                .map(|exercise| insert_exercise(&tx, &workout_id, exercise, now))
                .collect::<rusqlite::Result<Vec<_>>>()?;

            tx.commit()?;
            Ok(inserted)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_workout(&self, id: &str, user_id: i64) -> Result<Option<Workout>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Option<Workout>> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ? AND user_id = ?")?;
            let result = stmt
                .query_row(rusqlite::params![id, user_id], Workout::from_row)
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Newest first. Workouts on the same date come back in reverse insertion order.
    pub async fn list_workouts(&self, user_id: i64) -> Result<Vec<WorkoutSummary>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<WorkoutSummary>> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT id, date, weekday FROM workouts
                 WHERE user_id = ?
                 ORDER BY date DESC, rowid DESC",
            )?;
            let workouts = stmt
                .query_map([user_id], WorkoutSummary::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workouts)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn list_exercises(&self, workout_id: &str) -> Result<Vec<ExerciseLine>> {
        let pool = self.pool.clone();
        let workout_id = workout_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<ExerciseLine>> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT name, sets, reps, weight FROM exercises
                 WHERE workout_id = ?
                 ORDER BY rowid",
            )?;
            let exercises = stmt
                .query_map([&workout_id], ExerciseLine::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn workout_exists(conn: &Connection, workout_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM workouts WHERE id = ?",
        [workout_id],
        |row| row.get(0),
    )
}

fn insert_exercise(
    conn: &Connection,
    workout_id: &str,
    exercise: &CompletedExercise,
    now: DateTime<Utc>,
) -> rusqlite::Result<Exercise> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO exercises (id, workout_id, name, sets, reps, weight, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            id,
            workout_id,
            exercise.name,
            exercise.sets,
            exercise.reps,
            exercise.weight,
            now
        ],
    )?;

    Ok(Exercise {
        id,
        workout_id: workout_id.to_string(),
        name: exercise.name.clone(),
        sets: exercise.sets,
        reps: exercise.reps,
        weight: exercise.weight,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;

    fn setup_test_db() -> DbPool {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        pool
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_workout() {
        let repo = WorkoutRepository::new(setup_test_db());

        let workout = repo
            .create_workout(1, date(2024, 10, 14), "Monday")
            .await
            .unwrap();

        assert!(!workout.id.is_empty());
        assert_eq!(workout.user_id, 1);

        let found = repo.find_workout(&workout.id, 1).await.unwrap().unwrap();
        assert_eq!(found.date, date(2024, 10, 14));
        assert_eq!(found.weekday, "Monday");
    }

    #[tokio::test]
    async fn test_create_workout_assigns_fresh_ids() {
        let repo = WorkoutRepository::new(setup_test_db());

        let first = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();
        let second = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_find_workout_wrong_user() {
        let repo = WorkoutRepository::new(setup_test_db());

        let workout = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();

        assert!(repo.find_workout(&workout.id, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_exercise_keeps_exact_weight() {
        let repo = WorkoutRepository::new(setup_test_db());
        let workout = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();

        let exercise = repo
            .add_exercise(&workout.id, "Bench Press", 3, 8, 62.5)
            .await
            .unwrap();
        assert_eq!(exercise.workout_id, workout.id);

        let lines = repo.list_exercises(&workout.id).await.unwrap();
        assert_eq!(
            lines,
            vec![ExerciseLine {
                name: "Bench Press".to_string(),
                sets: 3,
                reps: 8,
                weight: 62.5,
            }]
        );
    }

    #[tokio::test]
    async fn test_add_exercise_missing_workout() {
        let repo = WorkoutRepository::new(setup_test_db());

        let result = repo.add_exercise("nonexistent", "Squat", 5, 5, 100.0).await;

        assert!(matches!(result, Err(AppError::Referential(id)) if id == "nonexistent"));
    }

    #[tokio::test]
    async fn test_add_exercises_is_all_or_nothing() {
        let pool = setup_test_db();
        let repo = WorkoutRepository::new(pool.clone());

        let drafts = vec![CompletedExercise {
            name: "Squat".to_string(),
            sets: 5,
            reps: 5,
            weight: 100.0,
        }];
        assert!(repo.add_exercises("missing", &drafts).await.is_err());

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_exercises_preserves_insertion_order() {
        let repo = WorkoutRepository::new(setup_test_db());
        let workout = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();

        for name in ["Squat", "Bench Press", "Deadlift", "Arm Curl"] {
            repo.add_exercise(&workout.id, name, 3, 10, 40.0).await.unwrap();
        }

        let names: Vec<_> = repo
            .list_exercises(&workout.id)
            .await
            .unwrap()
            .into_iter()
            .map(|line| line.name)
            .collect();
        assert_eq!(names, vec!["Squat", "Bench Press", "Deadlift", "Arm Curl"]);
    }

    #[tokio::test]
    async fn test_list_workouts_newest_first() {
        let repo = WorkoutRepository::new(setup_test_db());

        let older = repo.create_workout(1, date(2024, 10, 1), "Tuesday").await.unwrap();
        let newer = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();
        let same_day = repo.create_workout(1, date(2024, 10, 14), "Monday").await.unwrap();
        repo.create_workout(2, date(2024, 10, 20), "Sunday").await.unwrap();

        let ids: Vec<_> = repo
            .list_workouts(1)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();

        assert_eq!(ids, vec![same_day.id, newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_list_workouts_is_repeatable() {
        let repo = WorkoutRepository::new(setup_test_db());
        repo.create_workout(1, date(2024, 10, 1), "Tuesday").await.unwrap();
        repo.create_workout(1, date(2024, 10, 3), "Thursday").await.unwrap();

        let first = repo.list_workouts(1).await.unwrap();
        let second = repo.list_workouts(1).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = setup_test_db();
        let conn = pool.get().unwrap();

        let result = conn.execute(
            "INSERT INTO exercises (id, workout_id, name, sets, reps, weight, created_at)
             VALUES ('e1', 'missing', 'Squat', 5, 5, 100.0, datetime('now'))",
            [],
        );

        assert!(result.is_err());
    }
}
