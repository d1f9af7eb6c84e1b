//! Event handlers: listings, submission, lifecycle transitions, deletion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateEventRequest, DeleteEventResponse, EventListParams, EventResponse,
    RegistrationClickResponse, TransitionResponse, UpdateStatusRequest,
};
use crate::app_state::AppState;
use crate::error::{DirectoryError, ErrorResponse};
use crate::persistence::EventFilter;
use crate::persistence::models::NewEvent;

/// `GET /events` — Approved upcoming events, soonest first.
///
/// # Errors
///
/// Returns [`DirectoryError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List approved upcoming events",
    description = "Returns approved events that have not ended yet, optionally filtered by community, event type, or city, ordered by start date.",
    params(EventListParams),
    responses(
        (status = 200, description = "Approved upcoming events", body = Vec<EventResponse>),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let filter = EventFilter {
        community_id: params.community_id,
        event_type: params.event_type,
        city_id: params.city_id,
    };
    let rows = state.store.list_upcoming_approved(Utc::now(), &filter).await?;
    let data: Vec<EventResponse> = rows.into_iter().map(EventResponse::from).collect();
    Ok(Json(data))
}

/// `GET /events/all` — Every live event for the admin view.
///
/// # Errors
///
/// Returns [`DirectoryError`] on storage failures.
#[utoipa::path(
    get,
    path = "/api/v1/events/all",
    tag = "Events",
    summary = "List all live events",
    description = "Returns every live event regardless of status, newest first. Admin view.",
    responses(
        (status = 200, description = "All live events", body = Vec<EventResponse>),
    )
)]
pub async fn list_all_events(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DirectoryError> {
    let rows = state.store.list_all_events().await?;
    let data: Vec<EventResponse> = rows.into_iter().map(EventResponse::from).collect();
    Ok(Json(data))
}

/// `POST /events` — Submit a new event (starts in `pending`).
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidRequest`] on invalid fields.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Submit a new event",
    description = "Creates an event in pending status awaiting moderation.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let new: NewEvent = req.into();
    let event = state.lifecycle.create_event(&new).await?;
    let event_id = event.id;
    let response = EventResponse::from(crate::persistence::models::EventWithCommunity {
        event,
        community_name: None,
    });
    tracing::debug!(%event_id, "event submission accepted");
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /events/{id}` — Fetch one live event.
///
/// # Errors
///
/// Returns [`DirectoryError::EventNotFound`] for unknown ids.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get one event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let row = state.store.fetch_event_with_community(id).await?;
    Ok(Json(EventResponse::from(row)))
}

/// `PUT /events/{id}/status` — Transition an event's lifecycle status.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidTransition`] for moves outside the
/// transition table and [`DirectoryError::Conflict`] on concurrent edits.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}/status",
    tag = "Events",
    summary = "Change an event's status",
    description = "Applies a lifecycle transition. Crossing the approved boundary adjusts community and venue counters; counter failures are reported as warnings, not errors.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = TransitionResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 422, description = "Illegal transition", body = ErrorResponse),
    )
)]
pub async fn update_event_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let outcome = state.lifecycle.set_status(id, req.status).await?;
    Ok(Json(TransitionResponse::from(outcome)))
}

/// `DELETE /events/{id}` — Delete a live event.
///
/// # Errors
///
/// Returns [`DirectoryError::EventNotFound`] for unknown ids.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Removes the live row. An approved event is uncounted from its community and venue; counter failures are reported as warnings.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event deleted", body = DeleteEventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let outcome = state.lifecycle.delete_event(id).await?;
    Ok(Json(DeleteEventResponse::from(outcome)))
}

/// `POST /events/{id}/registration-click` — Record a registration click.
///
/// # Errors
///
/// Returns [`DirectoryError::EventNotFound`] for unknown ids.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/registration-click",
    tag = "Events",
    summary = "Record a registration click",
    description = "Atomically increments the event's registration-click counter.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Click recorded", body = RegistrationClickResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn registration_click(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let registration_clicks = state.lifecycle.record_registration_click(id).await?;
    Ok(Json(RegistrationClickResponse {
        registration_clicks,
    }))
}

/// Event routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/all", get(list_all_events))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route("/events/{id}/status", put(update_event_status))
        .route("/events/{id}/registration-click", post(registration_click))
}
