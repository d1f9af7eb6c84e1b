//! Event-related DTOs for listing, submission, and lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::EventStatus;
use crate::persistence::models::{EventWithCommunity, NewEvent};
use crate::service::{DeleteOutcome, TransitionOutcome};

/// Query filters for `GET /events`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EventListParams {
    /// Restrict to one community.
    pub community_id: Option<Uuid>,
    /// Restrict to one event type.
    pub event_type: Option<String>,
    /// Restrict to one city.
    pub city_id: Option<Uuid>,
}

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Banner image URL in asset storage.
    #[serde(default)]
    pub banner_url: Option<String>,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event, when known.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Free-text venue label.
    #[serde(default)]
    pub venue: Option<String>,
    /// Whether the event happens online.
    #[serde(default)]
    pub is_online: bool,
    /// Event category (e.g. `"Meetup"`).
    pub event_type: String,
    /// Owning community.
    #[serde(default)]
    pub community_id: Option<Uuid>,
    /// Attached venue.
    #[serde(default)]
    pub venue_id: Option<Uuid>,
    /// City the event is listed under.
    #[serde(default)]
    pub city_id: Option<Uuid>,
    /// External registration link.
    #[serde(default)]
    pub registration_url: Option<String>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            banner_url: req.banner_url,
            date: req.date,
            end_date: req.end_date,
            venue: req.venue,
            is_online: req.is_online,
            event_type: req.event_type,
            community_id: req.community_id,
            venue_id: req.venue_id,
            city_id: req.city_id,
            registration_url: req.registration_url,
        }
    }
}

/// Request body for `PUT /events/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Status the event should move to.
    pub status: EventStatus,
}

/// A live event with its community name, as returned by listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    /// Event identifier.
    pub id: Uuid,
    /// Event title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Banner image URL.
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
    /// Name of the owning community, when resolvable.
    pub community_name: Option<String>,
    /// Attached venue.
    pub venue_id: Option<Uuid>,
    /// City the event is listed under.
    pub city_id: Option<Uuid>,
    /// Moderation status.
    pub status: EventStatus,
    /// External registration link.
    pub registration_url: Option<String>,
    /// Registration-link click count.
    pub registration_clicks: i64,
    /// Whether the event is featured.
    pub featured: bool,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<EventWithCommunity> for EventResponse {
    fn from(source: EventWithCommunity) -> Self {
        let event = source.event;
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            banner_url: event.banner_url,
            date: event.date,
            end_date: event.end_date,
            venue: event.venue,
            is_online: event.is_online,
            event_type: event.event_type,
            community_id: event.community_id,
            community_name: source.community_name,
            venue_id: event.venue_id,
            city_id: event.city_id,
            status: event.status,
            registration_url: event.registration_url,
            registration_clicks: event.registration_clicks,
            featured: event.featured,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Response body for `PUT /events/{id}/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    /// Event that transitioned.
    pub event_id: Uuid,
    /// Status observed before the write.
    pub previous: EventStatus,
    /// Status after the write.
    pub status: EventStatus,
    /// Human-readable descriptions of swallowed counter failures.
    pub warnings: Vec<String>,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            event_id: outcome.event_id,
            previous: outcome.previous,
            status: outcome.status,
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Response body for `DELETE /events/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteEventResponse {
    /// Event that was deleted.
    pub event_id: Uuid,
    /// Whether the event was approved (and uncounted) at deletion time.
    pub was_approved: bool,
    /// Human-readable descriptions of swallowed counter failures.
    pub warnings: Vec<String>,
}

impl From<DeleteOutcome> for DeleteEventResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            event_id: outcome.event_id,
            was_approved: outcome.was_approved,
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Response body for `POST /events/{id}/registration-click`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationClickResponse {
    /// The event's click count after the increment.
    pub registration_clicks: i64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::models::EventRecord;

    fn ts(text: &str) -> DateTime<Utc> {
        text.parse().ok().unwrap_or_else(|| panic!("bad timestamp"))
    }

    #[test]
    fn event_response_carries_the_community_name() {
        let source = EventWithCommunity {
            event: EventRecord {
                id: Uuid::new_v4(),
                title: "Hack Night".to_string(),
                description: None,
                banner_url: None,
                date: ts("2026-05-01T18:00:00Z"),
                end_date: None,
                venue: Some("Makerspace".to_string()),
                is_online: false,
                event_type: "Hackathon".to_string(),
                community_id: Some(Uuid::new_v4()),
                venue_id: None,
                city_id: None,
                status: EventStatus::Approved,
                registration_url: None,
                registration_clicks: 0,
                featured: false,
                created_at: ts("2026-04-01T00:00:00Z"),
                updated_at: ts("2026-04-01T00:00:00Z"),
            },
            community_name: Some("Makers United".to_string()),
        };

        let response = EventResponse::from(source);
        assert_eq!(response.community_name.as_deref(), Some("Makers United"));
        assert_eq!(response.status, EventStatus::Approved);
    }
}
