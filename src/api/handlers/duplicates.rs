//! Duplicate-resolution handlers: pending queue and the three decisions.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CandidateResponse, InvestigateRequest, MergeResponse, ResolutionResponse, ReviewRequest,
};
use crate::app_state::AppState;
use crate::error::{DirectoryError, ErrorResponse};

/// `GET /duplicates` — Pending candidates in review-priority order.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/duplicates",
    tag = "Duplicates",
    summary = "List pending duplicate candidates",
    description = "Returns candidates awaiting review, highest similarity score first.",
    responses(
        (status = 200, description = "Pending candidates", body = Vec<CandidateResponse>),
    )
)]
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, DirectoryError> {
    let rows = state.duplicates.pending().await?;
    let data: Vec<CandidateResponse> = rows.into_iter().map(CandidateResponse::from).collect();
    Ok(Json(data))
}

/// `POST /duplicates/{id}/merge` — Merge the duplicate into the original.
///
/// # Errors
///
/// Returns [`DirectoryError::Conflict`] when the candidate was already
/// resolved, or [`DirectoryError::Storage`] when a merge step fails.
#[utoipa::path(
    post,
    path = "/api/v1/duplicates/{id}/merge",
    tag = "Duplicates",
    summary = "Approve a merge",
    description = "Reassigns every event from the duplicate community to the original, deletes the duplicate, and resolves the candidate as merge_approved. Irreversible.",
    params(
        ("id" = uuid::Uuid, Path, description = "Candidate UUID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Merge completed", body = MergeResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 409, description = "Candidate already resolved", body = ErrorResponse),
    )
)]
pub async fn merge(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let outcome = state.duplicates.merge(id, req.reviewer()).await?;
    Ok(Json(MergeResponse::from(outcome)))
}

/// `POST /duplicates/{id}/keep-separate` — Confirm distinct communities.
///
/// # Errors
///
/// Returns [`DirectoryError::Conflict`] when the candidate was already
/// resolved.
#[utoipa::path(
    post,
    path = "/api/v1/duplicates/{id}/keep-separate",
    tag = "Duplicates",
    summary = "Keep the communities separate",
    description = "Resolves the candidate as keep_separate without touching any community or event data.",
    params(
        ("id" = uuid::Uuid, Path, description = "Candidate UUID"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Candidate resolved", body = ResolutionResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 409, description = "Candidate already resolved", body = ErrorResponse),
    )
)]
pub async fn keep_separate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let outcome = state.duplicates.keep_separate(id, req.reviewer()).await?;
    Ok(Json(ResolutionResponse::from(outcome)))
}

/// `POST /duplicates/{id}/investigate` — Park with notes for a closer look.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidRequest`] for blank notes and
/// [`DirectoryError::Conflict`] when the candidate was already resolved.
#[utoipa::path(
    post,
    path = "/api/v1/duplicates/{id}/investigate",
    tag = "Duplicates",
    summary = "Mark for investigation",
    description = "Resolves the candidate as needs_investigation with admin-supplied notes. No other data is touched.",
    params(
        ("id" = uuid::Uuid, Path, description = "Candidate UUID"),
    ),
    request_body = InvestigateRequest,
    responses(
        (status = 200, description = "Candidate resolved", body = ResolutionResponse),
        (status = 400, description = "Notes missing", body = ErrorResponse),
        (status = 404, description = "Candidate not found", body = ErrorResponse),
        (status = 409, description = "Candidate already resolved", body = ErrorResponse),
    )
)]
pub async fn investigate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<InvestigateRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let outcome = state
        .duplicates
        .investigate(id, req.reviewer(), &req.notes)
        .await?;
    Ok(Json(ResolutionResponse::from(outcome)))
}

/// Duplicate-resolution routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/duplicates", get(list_pending))
        .route("/duplicates/{id}/merge", post(merge))
        .route("/duplicates/{id}/keep-separate", post(keep_separate))
        .route("/duplicates/{id}/investigate", post(investigate))
}
