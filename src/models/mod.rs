pub mod event;
pub mod exercise;
pub mod from_row;
pub mod workout;

pub use event::{Choice, Command, Event, Input, Reply};
pub use exercise::{CompletedExercise, Exercise, ExerciseDraft, ExerciseLine};
pub use from_row::FromSqliteRow;
pub use workout::{weekday_name, Workout, WorkoutSummary};
