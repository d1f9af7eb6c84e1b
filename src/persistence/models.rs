//! Database models for live events, archive snapshots, aggregates, and
//! duplicate candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CandidateStatus, EventStatus};

// The status enums are stored as lowercase text; these impls let records
// hold the typed enums while columns stay plain VARCHAR. Writes bind
// `as_str()` so only the decode direction is needed.

impl sqlx::Type<sqlx::Postgres> for EventStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for EventStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        text.parse().map_err(Into::into)
    }
}

impl sqlx::Type<sqlx::Postgres> for CandidateStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CandidateStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        text.parse().map_err(Into::into)
    }
}

/// A live event row from the `events` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventRecord {
    /// Event identifier; carried over unchanged into the archive.
    pub id: Uuid,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Banner image URL in asset storage.
    pub banner_url: Option<String>,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
    /// Free-text venue label as entered by the organizer.
    pub venue: Option<String>,
    /// Whether the event happens online rather than at a venue.
    pub is_online: bool,
    /// Event category (e.g. `"Meetup"`, `"Hackathon"`).
    pub event_type: String,
    /// Owning community.
    pub community_id: Option<Uuid>,
    /// Attached venue, once resolved.
    pub venue_id: Option<Uuid>,
    /// City the event is listed under.
    pub city_id: Option<Uuid>,
    /// Moderation status.
    pub status: EventStatus,
    /// External registration link.
    pub registration_url: Option<String>,
    /// Monotonic count of registration-link clicks.
    pub registration_clicks: i64,
    /// Whether the event is featured in curated listings.
    pub featured: bool,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An event row joined with its community's name, as fetched by the
/// archival engine for snapshot building.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventWithCommunity {
    /// The live event row.
    #[sqlx(flatten)]
    pub event: EventRecord,
    /// Name of the owning community at fetch time, if any.
    pub community_name: Option<String>,
}

/// The fetch-before-write projection of an event: exactly the fields a
/// lifecycle operation must read before mutating.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventHeader {
    /// Status at fetch time.
    pub status: EventStatus,
    /// Owning community at fetch time.
    pub community_id: Option<Uuid>,
    /// Attached venue at fetch time.
    pub venue_id: Option<Uuid>,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
}

impl EventHeader {
    /// Whether the event is over relative to `now` (end date, falling
    /// back to the start date for open-ended events).
    #[must_use]
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.end_date.unwrap_or(self.date) < now
    }
}

/// Fields accepted when creating a new event. The row always starts in
/// `pending` status with zero clicks.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Banner image URL in asset storage.
    pub banner_url: Option<String>,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
    /// Free-text venue label.
    pub venue: Option<String>,
    /// Whether the event happens online.
    pub is_online: bool,
    /// Event category.
    pub event_type: String,
    /// Owning community.
    pub community_id: Option<Uuid>,
    /// Attached venue.
    pub venue_id: Option<Uuid>,
    /// City the event is listed under.
    pub city_id: Option<Uuid>,
    /// External registration link.
    pub registration_url: Option<String>,
}

/// A sponsor row with its stored banner asset.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SponsorRecord {
    /// Sponsor row identifier.
    pub id: Uuid,
    /// Event the sponsor is attached to.
    pub event_id: Uuid,
    /// Sponsor display name.
    pub name: String,
    /// Stored banner asset URL, if uploaded.
    pub banner_url: Option<String>,
    /// Sponsor website link.
    pub website_url: Option<String>,
}

/// An immutable archive row from the `archived_events` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ArchivedEventRecord {
    /// Same id the live event had; the primary-key collision on this
    /// column is the idempotency guard for retried runs.
    pub id: Uuid,
    /// Title at archive time.
    pub title: String,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
    /// Venue label; `"Online"` when the live row had none.
    pub venue: String,
    /// Whether the event happened online.
    pub is_online: bool,
    /// Event category.
    pub event_type: String,
    /// Owning community at archive time.
    pub community_id: Option<Uuid>,
    /// Community name snapshot, frozen at archive time.
    pub community_name: String,
    /// City the event was listed under.
    pub city_id: Option<Uuid>,
    /// Admin curation flag; mutable on the archive row.
    pub featured: bool,
    /// Banner URL snapshot.
    pub banner_url: Option<String>,
    /// Registration clicks; admin curation applies updates here.
    pub registration_clicks: i64,
    /// Creation timestamp of the original live row.
    pub created_at: Option<DateTime<Utc>>,
    /// When the snapshot was taken.
    pub archived_at: DateTime<Utc>,
}

/// An archive snapshot built from a live event, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewArchivedEvent {
    /// Id carried over from the live event.
    pub id: Uuid,
    /// Title at archive time.
    pub title: String,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    pub end_date: Option<DateTime<Utc>>,
    /// Venue label, defaulted to `"Online"` when absent.
    pub venue: String,
    /// Whether the event happened online.
    pub is_online: bool,
    /// Event category.
    pub event_type: String,
    /// Owning community.
    pub community_id: Option<Uuid>,
    /// Community name snapshot, `"Unknown Community"` when unresolvable.
    pub community_name: String,
    /// City the event was listed under.
    pub city_id: Option<Uuid>,
    /// Featured flag carried over from the live row.
    pub featured: bool,
    /// Banner URL carried over from the live row.
    pub banner_url: Option<String>,
    /// Registration clicks carried over from the live row.
    pub registration_clicks: i64,
    /// Creation timestamp of the live row.
    pub created_at: DateTime<Utc>,
    /// When the snapshot was taken.
    pub archived_at: DateTime<Utc>,
}

impl NewArchivedEvent {
    /// Builds the point-in-time snapshot of a live event.
    #[must_use]
    pub fn from_live(source: &EventWithCommunity, archived_at: DateTime<Utc>) -> Self {
        let event = &source.event;
        Self {
            id: event.id,
            title: event.title.clone(),
            date: event.date,
            end_date: event.end_date,
            venue: event
                .venue
                .clone()
                .unwrap_or_else(|| "Online".to_string()),
            is_online: event.is_online,
            event_type: event.event_type.clone(),
            community_id: event.community_id,
            community_name: source
                .community_name
                .clone()
                .unwrap_or_else(|| "Unknown Community".to_string()),
            city_id: event.city_id,
            featured: event.featured,
            banner_url: event.banner_url.clone(),
            registration_clicks: event.registration_clicks,
            created_at: event.created_at,
            archived_at,
        }
    }
}

/// A community row from the `communities` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommunityRecord {
    /// Community identifier.
    pub id: Uuid,
    /// Community name.
    pub name: String,
    /// Logo URL.
    pub logo: Option<String>,
    /// Website link.
    pub website: Option<String>,
    /// City the community belongs to.
    pub city_id: Option<Uuid>,
    /// Verification status (`pending`/`approved`/`rejected`).
    pub verification_status: String,
    /// Denormalized count of approved events, maintained only through
    /// the counter store.
    pub event_count: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A venue row from the `venues` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VenueRecord {
    /// Venue identifier.
    pub id: Uuid,
    /// Venue name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City the venue belongs to.
    pub city_id: Option<Uuid>,
    /// Seating capacity, when known.
    pub capacity: Option<i32>,
    /// Website link.
    pub website: Option<String>,
    /// Verification status (`pending`/`approved`/`rejected`).
    pub verification_status: String,
    /// Denormalized count of approved events, maintained only through
    /// the counter store.
    pub event_count: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A duplicate-community candidate from `admin_community_duplicates`.
///
/// Produced by an external detector; this service only moves
/// `admin_status` out of `pending`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DuplicateCandidateRecord {
    /// Candidate row identifier.
    pub id: Uuid,
    /// Community presumed to be the canonical one.
    pub original_community_id: Uuid,
    /// Name snapshot of the canonical community.
    pub original_community_name: String,
    /// Community suspected to be a duplicate.
    pub duplicate_community_id: Uuid,
    /// Name snapshot of the suspected duplicate.
    pub duplicate_community_name: String,
    /// Overall similarity score supplied by the detector.
    pub similarity_score: f64,
    /// Per-signal sub-scores (name/location/website/contact/social).
    pub score_breakdown: Option<serde_json::Value>,
    /// Detector flag: websites matched.
    pub website_match: bool,
    /// Detector flag: organizer emails matched.
    pub organizer_email_match: bool,
    /// Detector flag: organizer phones matched.
    pub organizer_phone_match: bool,
    /// Detector flag: social handles matched.
    pub social_media_match: bool,
    /// Review status.
    pub admin_status: CandidateStatus,
    /// Accumulated review notes.
    pub admin_notes: Option<String>,
    /// Reviewer who resolved the candidate.
    pub reviewed_by: Option<String>,
    /// When the candidate was resolved.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// When the detector produced the candidate.
    pub detected_at: DateTime<Utc>,
}

/// An audit log row from the `cleanup_logs` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLogRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Action tag (e.g. `"event_cleanup"`, `"counter_update"`).
    pub action: String,
    /// Structured result payload for successful runs.
    pub result: Option<serde_json::Value>,
    /// Error string for failed runs.
    pub error: Option<String>,
    /// When the entry was recorded.
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn ts(text: &str) -> DateTime<Utc> {
        text.parse().ok().unwrap_or_else(|| panic!("bad timestamp"))
    }

    fn sample_event() -> EventRecord {
        EventRecord {
            id: Uuid::new_v4(),
            title: "Rust Meetup #12".to_string(),
            description: Some("Monthly meetup".to_string()),
            banner_url: None,
            date: ts("2026-02-01T18:00:00Z"),
            end_date: Some(ts("2026-02-01T21:00:00Z")),
            venue: None,
            is_online: true,
            event_type: "Meetup".to_string(),
            community_id: Some(Uuid::new_v4()),
            venue_id: None,
            city_id: Some(Uuid::new_v4()),
            status: EventStatus::Approved,
            registration_url: None,
            registration_clicks: 7,
            featured: false,
            created_at: ts("2026-01-10T09:00:00Z"),
            updated_at: ts("2026-01-10T09:00:00Z"),
        }
    }

    #[test]
    fn snapshot_keeps_the_live_id() {
        let source = EventWithCommunity {
            event: sample_event(),
            community_name: Some("Rustaceans".to_string()),
        };
        let snap = NewArchivedEvent::from_live(&source, Utc::now());
        assert_eq!(snap.id, source.event.id);
        assert_eq!(snap.community_name, "Rustaceans");
        assert_eq!(snap.registration_clicks, 7);
    }

    #[test]
    fn snapshot_defaults_venue_and_community_name() {
        let source = EventWithCommunity {
            event: sample_event(),
            community_name: None,
        };
        let snap = NewArchivedEvent::from_live(&source, Utc::now());
        assert_eq!(snap.venue, "Online");
        assert_eq!(snap.community_name, "Unknown Community");
        assert!(snap.banner_url.is_none());
        assert!(!snap.featured);
    }

    #[test]
    fn snapshot_prefers_the_entered_venue() {
        let mut event = sample_event();
        event.venue = Some("Innovation Hub".to_string());
        let source = EventWithCommunity {
            event,
            community_name: Some("Startup Hub".to_string()),
        };
        let snap = NewArchivedEvent::from_live(&source, Utc::now());
        assert_eq!(snap.venue, "Innovation Hub");
    }

    #[test]
    fn header_has_passed_uses_end_date_then_start_date() {
        let now = ts("2026-03-01T00:00:00Z");
        let header = EventHeader {
            status: EventStatus::Cancelled,
            community_id: None,
            venue_id: None,
            date: ts("2026-02-01T18:00:00Z"),
            end_date: Some(ts("2026-03-02T21:00:00Z")),
        };
        assert!(!header.has_passed(now));

        let open_ended = EventHeader {
            end_date: None,
            ..header
        };
        assert!(open_ended.has_passed(now));
    }
}
