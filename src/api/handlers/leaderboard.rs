//! Leaderboard handlers: top communities and venues by event count.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CommunityEntry, LeaderboardParams, VenueEntry};
use crate::app_state::AppState;
use crate::error::DirectoryError;

/// How many entries a leaderboard shows.
const LEADERBOARD_SIZE: i64 = 10;

/// `GET /leaderboard/communities` — Most active communities.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/communities",
    tag = "Leaderboards",
    summary = "Community leaderboard",
    description = "Top approved communities with at least one counted event, by event count descending.",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Leaderboard entries", body = Vec<CommunityEntry>),
    )
)]
pub async fn community_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let rows = state
        .store
        .community_leaderboard(params.city_id, LEADERBOARD_SIZE)
        .await?;
    let data: Vec<CommunityEntry> = rows.into_iter().map(CommunityEntry::from).collect();
    Ok(Json(data))
}

/// `GET /leaderboard/venues` — Most active venues.
///
/// # Errors
///
/// Returns [`DirectoryError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/venues",
    tag = "Leaderboards",
    summary = "Venue leaderboard",
    description = "Top approved venues with at least one counted event, by event count descending.",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Leaderboard entries", body = Vec<VenueEntry>),
    )
)]
pub async fn venue_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let rows = state
        .store
        .venue_leaderboard(params.city_id, LEADERBOARD_SIZE)
        .await?;
    let data: Vec<VenueEntry> = rows.into_iter().map(VenueEntry::from).collect();
    Ok(Json(data))
}

/// Leaderboard routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard/communities", get(community_leaderboard))
        .route("/leaderboard/venues", get(venue_leaderboard))
}
