//! Per-user conversation slots.
//!
//! Each slot holds the user's position in the conversation and, while a
//! workout is being entered, the in-progress session. Slots that stay idle
//! longer than the configured TTL are treated as absent and dropped lazily
//! on access or in bulk by [`SessionStore::cleanup_expired`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::conversation::State;
use crate::error::{AppError, Result};
use crate::models::{CompletedExercise, ExerciseDraft};

/// Workout being entered by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub workout_id: String,
    pub exercises: Vec<CompletedExercise>,
    pub draft: ExerciseDraft,
}

/// One field of the exercise draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    Sets(u32),
    Reps(u32),
    Weight(f64),
}

#[derive(Debug)]
struct Slot {
    state: State,
    session: Option<Session>,
    touched_at: DateTime<Utc>,
}

impl Slot {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: State::MainMenu,
            session: None,
            touched_at: now,
        }
    }
}

pub struct SessionStore {
    slots: Mutex<HashMap<i64, Slot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, slot: &Slot, now: DateTime<Utc>) -> bool {
        now - slot.touched_at > self.ttl
    }

    /// Drop the user's slot if it has been idle past the TTL.
    fn evict_if_expired(&self, slots: &mut HashMap<i64, Slot>, user_id: i64, now: DateTime<Utc>) {
        if slots
            .get(&user_id)
            .is_some_and(|slot| self.is_expired(slot, now))
        {
            tracing::debug!(user_id, "dropping idle conversation slot");
            slots.remove(&user_id);
        }
    }

    fn live_slot<'a>(
        &self,
        slots: &'a mut HashMap<i64, Slot>,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Option<&'a mut Slot> {
        self.evict_if_expired(slots, user_id, now);
        slots.get_mut(&user_id)
    }

    fn slot_or_insert<'a>(
        &self,
        slots: &'a mut HashMap<i64, Slot>,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> &'a mut Slot {
        self.evict_if_expired(slots, user_id, now);
        slots.entry(user_id).or_insert_with(|| Slot::new(now))
    }

    fn session_mut<'a>(
        &self,
        slots: &'a mut HashMap<i64, Slot>,
        user_id: i64,
    ) -> Result<&'a mut Session> {
        let now = self.clock.now();
        let slot = self
            .live_slot(slots, user_id, now)
            .ok_or(AppError::NoActiveSession(user_id))?;
        slot.touched_at = now;
        slot.session
            .as_mut()
            .ok_or(AppError::NoActiveSession(user_id))
    }

    /// Current conversational position. Unknown or idle users are at the main menu.
    pub fn state(&self, user_id: i64) -> State {
        let now = self.clock.now();
        let mut slots = self.lock();
        self.live_slot(&mut slots, user_id, now)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    pub fn set_state(&self, user_id: i64, state: State) {
        let now = self.clock.now();
        let mut slots = self.lock();
        let slot = self.slot_or_insert(&mut slots, user_id, now);
        slot.state = state;
        slot.touched_at = now;
    }

    /// Start a session with an empty exercise list, replacing any previous one.
    pub fn begin(&self, user_id: i64, workout_id: impl Into<String>) {
        let now = self.clock.now();
        let mut slots = self.lock();
        let slot = self.slot_or_insert(&mut slots, user_id, now);
        if let Some(stale) = &slot.session {
            tracing::debug!(user_id, workout_id = %stale.workout_id, "replacing stale session");
        }
        slot.session = Some(Session {
            workout_id: workout_id.into(),
            exercises: Vec::new(),
            draft: ExerciseDraft::Empty,
        });
        slot.touched_at = now;
    }

    pub fn session(&self, user_id: i64) -> Option<Session> {
        let now = self.clock.now();
        let mut slots = self.lock();
        self.live_slot(&mut slots, user_id, now)
            .and_then(|slot| slot.session.clone())
    }

    /// Fill in the next draft field. A name always starts a fresh draft; the
    /// numeric fields must follow in order (sets, reps, weight).
    pub fn set_draft_field(&self, user_id: i64, field: DraftField) -> Result<()> {
        let mut slots = self.lock();
        let session = self.session_mut(&mut slots, user_id)?;

        let draft = std::mem::take(&mut session.draft);
        let (next, outcome) = match (draft, field) {
            (_, DraftField::Name(name)) => (ExerciseDraft::Named { name }, Ok(())),
            (ExerciseDraft::Named { name }, DraftField::Sets(sets)) => {
                (ExerciseDraft::WithSets { name, sets }, Ok(()))
            }
            (ExerciseDraft::WithSets { name, sets }, DraftField::Reps(reps)) => {
                (ExerciseDraft::WithReps { name, sets, reps }, Ok(()))
            }
            (ExerciseDraft::WithReps { name, sets, reps }, DraftField::Weight(weight)) => (
                ExerciseDraft::Complete(CompletedExercise {
                    name,
                    sets,
                    reps,
                    weight,
                }),
                Ok(()),
            ),
            (draft, field) => {
                let message = format!("cannot set {:?} on draft {:?}", field, draft);
                (draft, Err(AppError::BadRequest(message)))
            }
        };
        session.draft = next;
        outcome
    }

    /// Move the completed draft into the session's exercise list.
    pub fn commit_draft(&self, user_id: i64) -> Result<CompletedExercise> {
        let mut slots = self.lock();
        let session = self.session_mut(&mut slots, user_id)?;

        match std::mem::take(&mut session.draft) {
            ExerciseDraft::Complete(exercise) => {
                session.exercises.push(exercise.clone());
                Ok(exercise)
            }
            incomplete => {
                let message = format!("draft is not complete: {:?}", incomplete);
                session.draft = incomplete;
                Err(AppError::BadRequest(message))
            }
        }
    }

    /// Remove the user's session, keeping their conversational position.
    pub fn end(&self, user_id: i64) -> Option<Session> {
        let now = self.clock.now();
        let mut slots = self.lock();
        self.live_slot(&mut slots, user_id, now)
            .and_then(|slot| slot.session.take())
    }

    /// Forget everything about the user.
    pub fn reset(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    /// Drop every idle slot. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|_, slot| !self.is_expired(slot, now));
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
