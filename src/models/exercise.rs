use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub workout_id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
}

/// Exercise as shown in the history detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseLine {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
}

impl FromSqliteRow for ExerciseLine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
        })
    }
}

/// A fully specified exercise that has not necessarily been written yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
}

/// Exercise being entered field by field. Each variant only carries the
/// fields collected so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExerciseDraft {
    #[default]
    Empty,
    Named {
        name: String,
    },
    WithSets {
        name: String,
        sets: u32,
    },
    WithReps {
        name: String,
        sets: u32,
        reps: u32,
    },
    Complete(CompletedExercise),
}

impl ExerciseDraft {
    pub fn name(&self) -> Option<&str> {
        match self {
            ExerciseDraft::Empty => None,
            ExerciseDraft::Named { name }
            | ExerciseDraft::WithSets { name, .. }
            | ExerciseDraft::WithReps { name, .. } => Some(name),
            ExerciseDraft::Complete(exercise) => Some(&exercise.name),
        }
    }

    pub fn sets(&self) -> Option<u32> {
        match self {
            ExerciseDraft::WithSets { sets, .. } | ExerciseDraft::WithReps { sets, .. } => {
                Some(*sets)
            }
            ExerciseDraft::Complete(exercise) => Some(exercise.sets),
            _ => None,
        }
    }

    pub fn reps(&self) -> Option<u32> {
        match self {
            ExerciseDraft::WithReps { reps, .. } => Some(*reps),
            ExerciseDraft::Complete(exercise) => Some(exercise.reps),
            _ => None,
        }
    }
}
