//! Leaderboard DTOs: top communities and venues by approved-event count.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::persistence::models::{CommunityRecord, VenueRecord};

/// Query parameters for the leaderboard endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LeaderboardParams {
    /// Restrict to one city; absent means directory-wide.
    pub city_id: Option<Uuid>,
}

/// One community leaderboard entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommunityEntry {
    /// Community identifier.
    pub id: Uuid,
    /// Community name.
    pub name: String,
    /// Logo URL.
    pub logo: Option<String>,
    /// City the community belongs to.
    pub city_id: Option<Uuid>,
    /// Denormalized approved-event count.
    pub event_count: i64,
}

impl From<CommunityRecord> for CommunityEntry {
    fn from(record: CommunityRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            logo: record.logo,
            city_id: record.city_id,
            event_count: record.event_count,
        }
    }
}

/// One venue leaderboard entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VenueEntry {
    /// Venue identifier.
    pub id: Uuid,
    /// Venue name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City the venue belongs to.
    pub city_id: Option<Uuid>,
    /// Denormalized approved-event count.
    pub event_count: i64,
}

impl From<VenueRecord> for VenueEntry {
    fn from(record: VenueRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            address: record.address,
            city_id: record.city_id,
            event_count: record.event_count,
        }
    }
}
