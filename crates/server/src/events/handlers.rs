//! Event handlers

use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::extract::JsonBody;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use events_common::{
    DeleteConfirmation, Event, EventPatch, NewAttendee, NewEvent, ReminderSummary,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/search", get(search_events))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/attendees/{event_id}", post(add_attendee))
        .route("/api/events/reminder/{event_id}", post(send_reminder))
}

/// GET /api/events
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    info!("GET /api/events");
    Json(state.events.list().await)
}

/// GET /api/events/search?query=
pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Event>> {
    info!("GET /api/events/search - {:?}", params.query);
    Json(state.events.search(&params.query).await)
}

/// GET /api/events/{id}
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Event>> {
    info!("GET /api/events/{}", id);
    Ok(Json(state.events.get(&id).await?))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewEvent>,
) -> Result<(StatusCode, Json<Event>)> {
    info!("POST /api/events - {:?}", req.name);
    let event = state.events.create(req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<EventPatch>,
) -> Result<Json<Event>> {
    info!("PUT /api/events/{}", id);
    Ok(Json(state.events.update(&id, patch).await?))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>> {
    info!("DELETE /api/events/{}", id);
    Ok(Json(state.events.delete(&id).await?))
}

/// POST /api/events/attendees/{event_id}
pub async fn add_attendee(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    JsonBody(req): JsonBody<NewAttendee>,
) -> Result<(StatusCode, Json<Event>)> {
    info!("POST /api/events/attendees/{}", event_id);
    let event = state.events.add_attendee(&event_id, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/events/reminder/{event_id}
pub async fn send_reminder(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ReminderSummary>> {
    info!("POST /api/events/reminder/{}", event_id);
    Ok(Json(state.events.send_reminder(&event_id).await?))
}
