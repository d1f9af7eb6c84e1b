//! Archival DTOs: sweep results, archive listings, curation, history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::persistence::models::{ArchivedEventRecord, AuditLogRecord};
use crate::service::SweepReport;

/// Structured result of a manual or scheduled archival run, mirroring
/// the audit-log payload plus wall-clock duration.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    /// Whether the run completed.
    pub success: bool,
    /// Live rows removed by this run.
    pub deleted_events: u64,
    /// Snapshots actually inserted.
    pub archived_events: u64,
    /// Events counted toward their aggregates.
    pub successful_events: u64,
    /// Distinct communities whose counters were touched.
    pub updated_communities: u64,
    /// Distinct venues whose counters were touched.
    pub updated_venues: u64,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Human-readable descriptions of swallowed failures.
    pub warnings: Vec<String>,
}

impl SweepResponse {
    /// Wraps a service report with timing information.
    #[must_use]
    pub fn from_report(report: SweepReport, duration_ms: u64) -> Self {
        Self {
            success: true,
            deleted_events: report.deleted_events,
            archived_events: report.archived_events,
            successful_events: report.successful_events,
            updated_communities: report.updated_communities,
            updated_venues: report.updated_venues,
            duration_ms,
            timestamp: Utc::now(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Query filters for `GET /archive/events`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ArchiveListParams {
    /// Restrict to one city.
    pub city_id: Option<Uuid>,
    /// Restrict to one community.
    pub community_id: Option<Uuid>,
    /// Restrict to featured (or non-featured) rows.
    pub featured: Option<bool>,
    /// Cap the number of rows returned.
    pub limit: Option<i64>,
}

/// Request body for `PATCH /archive/events/{id}` — the only archive
/// fields an admin may curate after the fact.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CurateArchivedRequest {
    /// New featured flag, when present.
    #[serde(default)]
    pub featured: Option<bool>,
    /// New click count, when present.
    #[serde(default)]
    pub registration_clicks: Option<i64>,
}

/// An archived event snapshot as returned by listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArchivedEventResponse {
    /// Id the live event had.
    pub id: Uuid,
    /// Title at archive time.
    pub title: String,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
    /// Venue label, `"Online"` for online events.
    pub venue: String,
    /// Whether the event happened online.
    pub is_online: bool,
    /// Event category.
    pub event_type: String,
    /// Owning community at archive time.
    pub community_id: Option<Uuid>,
    /// Community name snapshot.
    pub community_name: String,
    /// City the event was listed under.
    pub city_id: Option<Uuid>,
    /// Curated featured flag.
    pub featured: bool,
    /// Banner URL snapshot.
    pub banner_url: Option<String>,
    /// Registration clicks.
    pub registration_clicks: i64,
    /// When the snapshot was taken.
    pub archived_at: DateTime<Utc>,
}

impl From<ArchivedEventRecord> for ArchivedEventResponse {
    fn from(record: ArchivedEventRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            date: record.date,
            end_date: record.end_date,
            venue: record.venue,
            is_online: record.is_online,
            event_type: record.event_type,
            community_id: record.community_id,
            community_name: record.community_name,
            city_id: record.city_id,
            featured: record.featured,
            banner_url: record.banner_url,
            registration_clicks: record.registration_clicks,
            archived_at: record.archived_at,
        }
    }
}

/// Query parameters for `GET /archive/history`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Maximum entries to return (default 10, max 100).
    pub limit: Option<i64>,
}

impl HistoryParams {
    /// Clamps the limit to `1..=100`, defaulting to 10.
    #[must_use]
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

/// One audit-log entry for `GET /archive/history`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditEntryResponse {
    /// Entry identifier.
    pub id: Uuid,
    /// Action tag.
    pub action: String,
    /// Result payload for successful runs.
    pub result: Option<serde_json::Value>,
    /// Error string for failed runs.
    pub error: Option<String>,
    /// When the entry was recorded.
    pub executed_at: DateTime<Utc>,
}

impl From<AuditLogRecord> for AuditEntryResponse {
    fn from(record: AuditLogRecord) -> Self {
        Self {
            id: record.id,
            action: record.action,
            result: record.result,
            error: record.error,
            executed_at: record.executed_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_clamps_to_bounds() {
        assert_eq!(HistoryParams { limit: None }.clamped_limit(), 10);
        assert_eq!(HistoryParams { limit: Some(0) }.clamped_limit(), 1);
        assert_eq!(HistoryParams { limit: Some(500) }.clamped_limit(), 100);
        assert_eq!(HistoryParams { limit: Some(25) }.clamped_limit(), 25);
    }

    #[test]
    fn sweep_response_flattens_warnings_to_strings() {
        let report = SweepReport {
            deleted_events: 2,
            archived_events: 2,
            successful_events: 2,
            updated_communities: 1,
            updated_venues: 1,
            warnings: vec![crate::domain::Warning::AssetCleanup {
                url: "banners/x.png".to_string(),
                reason: "timeout".to_string(),
            }],
        };
        let response = SweepResponse::from_report(report, 12);
        assert!(response.success);
        assert_eq!(response.duration_ms, 12);
        assert_eq!(response.warnings.len(), 1);
        assert!(response.warnings.iter().any(|w| w.contains("banners/x.png")));
    }
}
