use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{events, health};

pub fn create_router(events_state: events::EventsState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/events", post(events::receive))
        .with_state(events_state)
}
