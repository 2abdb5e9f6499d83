//! Builds the text and choice buttons sent back to the chat.
//!
//! Everything here is pure: it formats domain data and never touches the
//! store or the session map.

use chrono::NaiveDate;

use crate::models::{Choice, Command, CompletedExercise, ExerciseLine, Reply, WorkoutSummary};

pub const START_WORKOUT: &str = "Start workout";
pub const VIEW_HISTORY: &str = "View history";
pub const ADD_ANOTHER: &str = "Add exercise";
pub const FINISH: &str = "Finish workout";
pub const BACK_TO_MENU: &str = "Back";
pub const BACK_TO_HISTORY: &str = "Back to history";

fn main_choices() -> Vec<Choice> {
    vec![
        Choice::new(START_WORKOUT, Command::StartWorkout),
        Choice::new(VIEW_HISTORY, Command::ViewHistory),
    ]
}

fn confirm_choices() -> Vec<Choice> {
    vec![
        Choice::new(ADD_ANOTHER, Command::AddAnother),
        Choice::new(FINISH, Command::Finish),
    ]
}

/// Map a typed main-menu label back to its command.
pub fn main_menu_command(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(START_WORKOUT) {
        Some(Command::StartWorkout)
    } else if text.eq_ignore_ascii_case(VIEW_HISTORY) {
        Some(Command::ViewHistory)
    } else {
        None
    }
}

pub fn greeting() -> Reply {
    Reply::with_choices("Hi! Choose an action:", main_choices())
}

pub fn main_menu() -> Reply {
    Reply::with_choices("Choose an action:", main_choices())
}

pub fn cancelled() -> Reply {
    Reply::with_choices("Cancelled. Choose an action:", main_choices())
}

pub fn prompt_name(first: bool) -> Reply {
    if first {
        Reply::text("Enter the name of the first exercise:")
    } else {
        Reply::text("Enter the name of the next exercise:")
    }
}

pub fn prompt_sets() -> Reply {
    Reply::text("How many sets?")
}

pub fn prompt_reps() -> Reply {
    Reply::text("How many reps?")
}

pub fn prompt_weight() -> Reply {
    Reply::text("What weight?")
}

pub fn invalid_count(prompt: Reply) -> Reply {
    Reply {
        text: format!("Please send a whole number, e.g. 5. {}", prompt.text),
        choices: prompt.choices,
    }
}

pub fn invalid_weight() -> Reply {
    Reply::text("Please send a number such as 100 or 62.5. What weight?")
}

pub fn exercise_added(exercise: &CompletedExercise) -> Reply {
    Reply::with_choices(
        format!(
            "Exercise added: {}",
            exercise_summary(&exercise.name, exercise.sets, exercise.reps, exercise.weight)
        ),
        confirm_choices(),
    )
}

pub fn confirm_prompt() -> Reply {
    Reply::with_choices("Add another exercise or finish the workout?", confirm_choices())
}

pub fn workout_finished(exercise_count: usize) -> Reply {
    let noun = if exercise_count == 1 {
        "exercise"
    } else {
        "exercises"
    };
    Reply::with_choices(
        format!(
            "Workout finished and saved with {} {}! Choose an action:",
            exercise_count, noun
        ),
        main_choices(),
    )
}

pub fn no_active_session() -> Reply {
    Reply::with_choices(
        "There is no workout in progress. Choose an action:",
        main_choices(),
    )
}

pub fn restart_required() -> Reply {
    Reply::with_choices(
        "This workout could not be saved, please restart it. Choose an action:",
        main_choices(),
    )
}

pub fn history_list(workouts: &[WorkoutSummary]) -> Reply {
    let back = Choice::new(BACK_TO_MENU, Command::BackToMenu);
    if workouts.is_empty() {
        return Reply::with_choices("Your history is empty.", vec![back]);
    }

    let mut choices: Vec<Choice> = workouts
        .iter()
        .map(|workout| {
            Choice::new(
                date_label(workout.date),
                Command::ShowWorkout {
                    workout_id: workout.id.clone(),
                },
            )
        })
        .collect();
    choices.push(back);

    Reply::with_choices("Choose a date:", choices)
}

pub fn workout_not_found(workouts: &[WorkoutSummary]) -> Reply {
    let list = history_list(workouts);
    Reply {
        text: format!("That workout was not found. {}", list.text),
        choices: list.choices,
    }
}

pub fn workout_detail(date: NaiveDate, exercises: &[ExerciseLine]) -> Reply {
    let mut text = format!("Workout on {}:\n\n", date_label(date));
    if exercises.is_empty() {
        text.push_str("No exercises recorded.");
    } else {
        let lines: Vec<String> = exercises
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                format!(
                    "{}. {}",
                    idx + 1,
                    exercise_summary(&line.name, line.sets, line.reps, line.weight)
                )
            })
            .collect();
        text.push_str(&lines.join("\n"));
    }

    Reply::with_choices(
        text,
        vec![Choice::new(BACK_TO_HISTORY, Command::BackToHistory)],
    )
}

/// `"Monday 14.10.2024"`. The weekday is derived from the date.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%A %d.%m.%Y").to_string()
}

fn exercise_summary(name: &str, sets: u32, reps: u32, weight: f64) -> String {
    format!("{} — {} x {} {}", name, sets, reps, format_weight(weight))
}

/// Weights always show a decimal part: `100.0`, `62.5`.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.1}", weight)
    } else {
        weight.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_main_menu_has_two_choices() {
        let reply = greeting();

        assert_eq!(
            reply.choice_ids(),
            vec![&Command::StartWorkout, &Command::ViewHistory]
        );
    }

    #[test]
    fn test_main_menu_command_from_label() {
        assert_eq!(main_menu_command("Start workout"), Some(Command::StartWorkout));
        assert_eq!(main_menu_command(" view HISTORY "), Some(Command::ViewHistory));
        assert_eq!(main_menu_command("Squat"), None);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(100.0), "100.0");
        assert_eq!(format_weight(62.5), "62.5");
        assert_eq!(format_weight(0.0), "0.0");
        assert_eq!(format_weight(80.75), "80.75");
    }

    #[test]
    fn test_date_label_uses_date_weekday() {
        assert_eq!(date_label(date(2024, 10, 14)), "Monday 14.10.2024");
    }

    #[test]
    fn test_history_list_labels_and_back() {
        let workouts = vec![
            WorkoutSummary {
                id: "b".to_string(),
                date: date(2024, 10, 14),
                weekday: "Monday".to_string(),
            },
            WorkoutSummary {
                id: "a".to_string(),
                date: date(2024, 10, 1),
                weekday: "Tuesday".to_string(),
            },
        ];

        let reply = history_list(&workouts);
        let choices = reply.choices.unwrap();

        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].label, "Monday 14.10.2024");
        assert_eq!(
            choices[0].id,
            Command::ShowWorkout {
                workout_id: "b".to_string()
            }
        );
        assert_eq!(choices[1].label, "Tuesday 01.10.2024");
        assert_eq!(choices[2].id, Command::BackToMenu);
    }

    #[test]
    fn test_history_list_ignores_stored_weekday() {
        let workouts = vec![WorkoutSummary {
            id: "a".to_string(),
            date: date(2024, 10, 14),
            weekday: "Friday".to_string(),
        }];

        let reply = history_list(&workouts);

        assert_eq!(reply.choices.unwrap()[0].label, "Monday 14.10.2024");
    }

    #[test]
    fn test_empty_history() {
        let reply = history_list(&[]);

        assert_eq!(reply.text, "Your history is empty.");
        assert_eq!(reply.choice_ids(), vec![&Command::BackToMenu]);
    }

    #[test]
    fn test_workout_detail_lines() {
        let exercises = vec![
            ExerciseLine {
                name: "Squat".to_string(),
                sets: 5,
                reps: 5,
                weight: 100.0,
            },
            ExerciseLine {
                name: "Bench Press".to_string(),
                sets: 3,
                reps: 8,
                weight: 62.5,
            },
        ];

        let reply = workout_detail(date(2024, 10, 14), &exercises);

        assert_eq!(
            reply.text,
            "Workout on Monday 14.10.2024:\n\n1. Squat — 5 x 5 100.0\n2. Bench Press — 3 x 8 62.5"
        );
        assert_eq!(reply.choice_ids(), vec![&Command::BackToHistory]);
    }

    #[test]
    fn test_workout_finished_pluralizes() {
        assert!(workout_finished(1).text.contains("1 exercise!"));
        assert!(workout_finished(3).text.contains("3 exercises!"));
    }
}
