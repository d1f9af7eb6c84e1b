//! REST endpoint handlers organized by resource.

pub mod archive;
pub mod duplicates;
pub mod events;
pub mod leaderboard;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(archive::routes())
        .merge(duplicates::routes())
        .merge(leaderboard::routes())
}
