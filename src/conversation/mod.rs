//! The conversation engine.
//!
//! Maps the user's current [`State`] and an incoming [`Event`] to a reply and
//! the next state, writing to the record store and the session map along
//! the way. Bad numeric input is answered with a re-prompt and never moves
//! the conversation forward.

pub mod parse;
pub mod state;

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::menu;
use crate::models::{weekday_name, Command, Event, ExerciseDraft, Input, Reply};
use crate::repositories::WorkoutRepository;
use crate::session::{DraftField, SessionStore};

pub use parse::{parse_count, parse_weight};
pub use state::State;

pub const START_COMMAND: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";

/// When exercises of a workout reach the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Each exercise is written as soon as its weight is entered.
    #[default]
    PerExercise,
    /// All exercises are written in one transaction when the workout is finished.
    OnFinish,
}

impl FromStr for CommitMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_exercise" => Ok(CommitMode::PerExercise),
            "on_finish" => Ok(CommitMode::OnFinish),
            other => Err(AppError::BadRequest(format!("unknown commit mode: {}", other))),
        }
    }
}

struct Transition {
    next: State,
    reply: Reply,
}

impl Transition {
    fn to(next: State, reply: Reply) -> Self {
        Self { next, reply }
    }
}

pub struct ConversationEngine {
    workouts: WorkoutRepository,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
    commit_mode: CommitMode,
    // Events are handled one at a time.
    gate: Mutex<()>,
}

impl ConversationEngine {
    pub fn new(
        workouts: WorkoutRepository,
        sessions: SessionStore,
        clock: Arc<dyn Clock>,
        commit_mode: CommitMode,
    ) -> Self {
        Self {
            workouts,
            sessions,
            clock,
            commit_mode,
            gate: Mutex::new(()),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn state_of(&self, user_id: i64) -> State {
        self.sessions.state(user_id)
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    pub async fn handle(&self, event: Event) -> Result<Reply> {
        let _turn = self.gate.lock().await;

        let user_id = event.user_id;
        let state = self.sessions.state(user_id);
        tracing::debug!(user_id, ?state, input = ?event.input, "handling event");

        let transition = match self.dispatch(user_id, state, event.input).await {
            Ok(transition) => transition,
            Err(AppError::NoActiveSession(_)) => {
                tracing::warn!(user_id, "draft input without an active session");
                Transition::to(State::MainMenu, menu::no_active_session())
            }
            Err(AppError::Referential(workout_id)) => {
                tracing::warn!(user_id, %workout_id, "workout row missing, dropping session");
                self.sessions.end(user_id);
                Transition::to(State::MainMenu, menu::restart_required())
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(user_id, next = ?transition.next, "transition");
        self.sessions.set_state(user_id, transition.next);
        Ok(transition.reply)
    }

    async fn dispatch(&self, user_id: i64, state: State, input: Input) -> Result<Transition> {
        if let Input::Text(text) = &input {
            match text.trim() {
                START_COMMAND => {
                    self.sessions.reset(user_id);
                    return Ok(Transition::to(State::MainMenu, menu::greeting()));
                }
                CANCEL_COMMAND => {
                    if state.is_data_entry() {
                        tracing::debug!(user_id, "cancelled during entry, session kept until idle");
                    }
                    return Ok(Transition::to(State::MainMenu, menu::cancelled()));
                }
                _ => {}
            }
        }

        match (state, input) {
            (State::MainMenu, input) => {
                let command = match input {
                    Input::Choice(command) => Some(command),
                    Input::Text(text) => menu::main_menu_command(&text),
                };
                match command {
                    Some(Command::StartWorkout) => self.start_workout(user_id).await,
                    Some(Command::ViewHistory) => self.show_history(user_id).await,
                    _ => Ok(Transition::to(State::MainMenu, menu::main_menu())),
                }
            }
            (State::AddName, Input::Text(text)) => {
                let name = text.trim();
                if name.is_empty() {
                    return self.reprompt(user_id, State::AddName).await;
                }
                self.sessions
                    .set_draft_field(user_id, DraftField::Name(name.to_string()))?;
                Ok(Transition::to(State::AddSets, menu::prompt_sets()))
            }
            (State::AddSets, Input::Text(text)) => match parse_count(&text) {
                Some(sets) => {
                    self.sessions
                        .set_draft_field(user_id, DraftField::Sets(sets))?;
                    Ok(Transition::to(State::AddReps, menu::prompt_reps()))
                }
                None => Ok(Transition::to(
                    State::AddSets,
                    menu::invalid_count(menu::prompt_sets()),
                )),
            },
            (State::AddReps, Input::Text(text)) => match parse_count(&text) {
                Some(reps) => {
                    self.sessions
                        .set_draft_field(user_id, DraftField::Reps(reps))?;
                    Ok(Transition::to(State::AddWeight, menu::prompt_weight()))
                }
                None => Ok(Transition::to(
                    State::AddReps,
                    menu::invalid_count(menu::prompt_reps()),
                )),
            },
            (State::AddWeight, Input::Text(text)) => match parse_weight(&text) {
                Some(weight) => self.record_exercise(user_id, weight).await,
                None => Ok(Transition::to(State::AddWeight, menu::invalid_weight())),
            },
            (State::Confirm, Input::Choice(Command::AddAnother)) => {
                if self.sessions.session(user_id).is_none() {
                    return Err(AppError::NoActiveSession(user_id));
                }
                Ok(Transition::to(State::AddName, menu::prompt_name(false)))
            }
            (State::Confirm, Input::Choice(Command::Finish)) => self.finish_workout(user_id).await,
            (State::HistoryList, Input::Choice(Command::ShowWorkout { workout_id })) => {
                self.show_workout(user_id, workout_id).await
            }
            (State::HistoryList, Input::Choice(Command::BackToMenu)) => {
                Ok(Transition::to(State::MainMenu, menu::main_menu()))
            }
            (State::HistoryDetail { .. }, Input::Choice(Command::BackToHistory)) => {
                self.show_history(user_id).await
            }
            (state, _) => self.reprompt(user_id, state).await,
        }
    }

    /// Repeat the prompt of `state` without changing anything.
    async fn reprompt(&self, user_id: i64, state: State) -> Result<Transition> {
        match state {
            State::MainMenu => Ok(Transition::to(State::MainMenu, menu::main_menu())),
            State::AddName => {
                let first = self
                    .sessions
                    .session(user_id)
                    .ok_or(AppError::NoActiveSession(user_id))?
                    .exercises
                    .is_empty();
                Ok(Transition::to(State::AddName, menu::prompt_name(first)))
            }
            State::AddSets => Ok(Transition::to(State::AddSets, menu::prompt_sets())),
            State::AddReps => Ok(Transition::to(State::AddReps, menu::prompt_reps())),
            State::AddWeight => Ok(Transition::to(State::AddWeight, menu::prompt_weight())),
            State::Confirm => Ok(Transition::to(State::Confirm, menu::confirm_prompt())),
            State::HistoryList => self.show_history(user_id).await,
            State::HistoryDetail { workout_id } => self.show_workout(user_id, workout_id).await,
        }
    }

    async fn start_workout(&self, user_id: i64) -> Result<Transition> {
        let today = self.clock.today();
        let workout = self
            .workouts
            .create_workout(user_id, today, &weekday_name(today))
            .await?;
        self.sessions.begin(user_id, workout.id);
        tracing::info!(user_id, %today, "workout started");

        Ok(Transition::to(State::AddName, menu::prompt_name(true)))
    }

    /// Write the exercise (in per-exercise mode) before the draft is
    /// committed, so a failed write leaves the draft ready for a retry.
    async fn record_exercise(&self, user_id: i64, weight: f64) -> Result<Transition> {
        let session = self
            .sessions
            .session(user_id)
            .ok_or(AppError::NoActiveSession(user_id))?;
        let ExerciseDraft::WithReps { name, sets, reps } = &session.draft else {
            return Err(AppError::BadRequest(format!(
                "weight sent for incomplete draft {:?}",
                session.draft
            )));
        };

        if self.commit_mode == CommitMode::PerExercise {
            self.workouts
                .add_exercise(&session.workout_id, name, *sets, *reps, weight)
                .await?;
        }

        self.sessions
            .set_draft_field(user_id, DraftField::Weight(weight))?;
        let exercise = self.sessions.commit_draft(user_id)?;
        tracing::debug!(user_id, name = %exercise.name, "exercise recorded");

        Ok(Transition::to(State::Confirm, menu::exercise_added(&exercise)))
    }

    async fn finish_workout(&self, user_id: i64) -> Result<Transition> {
        let session = self
            .sessions
            .session(user_id)
            .ok_or(AppError::NoActiveSession(user_id))?;

        if self.commit_mode == CommitMode::OnFinish {
            self.workouts
                .add_exercises(&session.workout_id, &session.exercises)
                .await?;
        }
        self.sessions.end(user_id);
        tracing::info!(
            user_id,
            workout_id = %session.workout_id,
            exercises = session.exercises.len(),
            "workout finished"
        );

        Ok(Transition::to(
            State::MainMenu,
            menu::workout_finished(session.exercises.len()),
        ))
    }

    async fn show_history(&self, user_id: i64) -> Result<Transition> {
        let workouts = self.workouts.list_workouts(user_id).await?;
        Ok(Transition::to(State::HistoryList, menu::history_list(&workouts)))
    }

    async fn show_workout(&self, user_id: i64, workout_id: String) -> Result<Transition> {
        let Some(workout) = self.workouts.find_workout(&workout_id, user_id).await? else {
            let workouts = self.workouts.list_workouts(user_id).await?;
            return Ok(Transition::to(
                State::HistoryList,
                menu::workout_not_found(&workouts),
            ));
        };

        let exercises = self.workouts.list_exercises(&workout.id).await?;
        Ok(Transition::to(
            State::HistoryDetail { workout_id },
            menu::workout_detail(workout.date, &exercises),
        ))
    }
}
