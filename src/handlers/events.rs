use std::sync::Arc;

use axum::{extract::State, Json};

use crate::conversation::ConversationEngine;
use crate::error::Result;
use crate::models::{Event, Reply};

#[derive(Clone)]
pub struct EventsState {
    pub engine: Arc<ConversationEngine>,
}

/// Feed one chat event to the conversation engine and return its reply.
pub async fn receive(
    State(state): State<EventsState>,
    Json(event): Json<Event>,
) -> Result<Json<Reply>> {
    let reply = state.engine.handle(event).await?;
    Ok(Json(reply))
}
