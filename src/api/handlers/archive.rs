//! Archival handlers: manual sweep trigger, single-event archival,
//! archive listings, curation, and cleanup history.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    ArchiveListParams, ArchivedEventResponse, AuditEntryResponse, CurateArchivedRequest,
    HistoryParams, SweepResponse,
};
use crate::app_state::AppState;
use crate::error::{DirectoryError, ErrorResponse};
use crate::persistence::ArchiveFilter;

/// `POST /archive/sweep` — Manually trigger the archival sweep.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] when a primary archival step fails.
#[utoipa::path(
    post,
    path = "/api/v1/archive/sweep",
    tag = "Archive",
    summary = "Run the archival sweep now",
    description = "Archives every approved event whose end date has passed: cleans up sponsor assets, snapshots into the archive, counts toward leaderboards, and deletes the live rows. Same procedure the scheduler runs daily.",
    responses(
        (status = 200, description = "Sweep result", body = SweepResponse),
        (status = 500, description = "Sweep failed", body = ErrorResponse),
    )
)]
pub async fn trigger_sweep(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DirectoryError> {
    let started = std::time::Instant::now();
    let report = state.archive.archive_expired(Utc::now()).await?;
    let duration_ms = started.elapsed().as_millis() as u64;
    Ok(Json(SweepResponse::from_report(report, duration_ms)))
}

/// `POST /events/{id}/archive` — Archive one event immediately.
///
/// # Errors
///
/// Returns [`DirectoryError::EventNotFound`] for unknown ids.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/archive",
    tag = "Archive",
    summary = "Archive one event now",
    description = "Moves one event to the archive regardless of its status or expiry. An approved event is counted toward its aggregates exactly once.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Archival result", body = SweepResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn archive_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let started = std::time::Instant::now();
    let report = state.archive.archive_one(id).await?;
    let duration_ms = started.elapsed().as_millis() as u64;
    Ok(Json(SweepResponse::from_report(report, duration_ms)))
}

/// `GET /archive/events` — List archived events.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/archive/events",
    tag = "Archive",
    summary = "List archived events",
    description = "Returns archive snapshots, newest event date first, optionally filtered by city, community, or featured flag.",
    params(ArchiveListParams),
    responses(
        (status = 200, description = "Archived events", body = Vec<ArchivedEventResponse>),
    )
)]
pub async fn list_archived(
    State(state): State<AppState>,
    Query(params): Query<ArchiveListParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let filter = ArchiveFilter {
        city_id: params.city_id,
        community_id: params.community_id,
        featured: params.featured,
        limit: params.limit,
    };
    let rows = state.store.list_archived(&filter).await?;
    let data: Vec<ArchivedEventResponse> =
        rows.into_iter().map(ArchivedEventResponse::from).collect();
    Ok(Json(data))
}

/// `PATCH /archive/events/{id}` — Curate an archive row.
///
/// # Errors
///
/// Returns [`DirectoryError::EventNotFound`] for unknown archive ids.
#[utoipa::path(
    patch,
    path = "/api/v1/archive/events/{id}",
    tag = "Archive",
    summary = "Curate an archived event",
    description = "Updates the featured flag or registration clicks on an archive row. All other snapshot fields are immutable.",
    params(
        ("id" = uuid::Uuid, Path, description = "Archived event UUID"),
    ),
    request_body = CurateArchivedRequest,
    responses(
        (status = 200, description = "Updated archive row", body = ArchivedEventResponse),
        (status = 404, description = "Archive row not found", body = ErrorResponse),
    )
)]
pub async fn curate_archived(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CurateArchivedRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    if req.featured.is_none() && req.registration_clicks.is_none() {
        return Err(DirectoryError::InvalidRequest(
            "at least one of featured or registration_clicks is required".to_string(),
        ));
    }
    let record = state
        .store
        .update_archived(id, req.featured, req.registration_clicks)
        .await?;
    Ok(Json(ArchivedEventResponse::from(record)))
}

/// `GET /archive/history` — Recent archival runs and swallowed failures.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/archive/history",
    tag = "Archive",
    summary = "Read the audit log",
    description = "Returns the most recent audit entries, newest first: sweep results plus swallowed counter and cleanup failures.",
    params(HistoryParams),
    responses(
        (status = 200, description = "Audit entries", body = Vec<AuditEntryResponse>),
    )
)]
pub async fn cleanup_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let rows = state.audit.recent(params.clamped_limit()).await?;
    let data: Vec<AuditEntryResponse> = rows.into_iter().map(AuditEntryResponse::from).collect();
    Ok(Json(data))
}

/// Archive routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/archive/sweep", post(trigger_sweep))
        .route("/events/{id}/archive", post(archive_event))
        .route("/archive/events", get(list_archived))
        .route("/archive/events/{id}", patch(curate_archived))
        .route("/archive/history", get(cleanup_history))
}
