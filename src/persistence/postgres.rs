//! PostgreSQL implementation of the directory store.
//!
//! All queries are raw SQL through `sqlx::PgPool`. Multi-row writes that
//! the archival engine depends on (`insert_archived`, `delete_events`)
//! are single statements so their all-or-nothing behavior comes from the
//! database, not from application loops.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{
    ArchivedEventRecord, CommunityRecord, DuplicateCandidateRecord, EventHeader, EventRecord,
    EventWithCommunity, NewArchivedEvent, NewEvent, SponsorRecord, VenueRecord,
};
use crate::domain::{CandidateStatus, EventStatus};
use crate::error::DirectoryError;

/// Filters for the public upcoming-events listing.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to one community.
    pub community_id: Option<Uuid>,
    /// Restrict to one event type.
    pub event_type: Option<String>,
    /// Restrict to one city.
    pub city_id: Option<Uuid>,
}

/// Filters for the archived-events listing.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFilter {
    /// Restrict to one city.
    pub city_id: Option<Uuid>,
    /// Restrict to one community.
    pub community_id: Option<Uuid>,
    /// Restrict to featured (or non-featured) rows.
    pub featured: Option<bool>,
    /// Cap the number of rows returned.
    pub limit: Option<i64>,
}

/// PostgreSQL-backed store for events, archives, aggregates, and
/// duplicate candidates.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    pool: PgPool,
}

impl DirectoryStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ── Live events ─────────────────────────────────────────────────────

    /// Inserts a new event in `pending` status and returns the row.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn create_event(&self, new: &NewEvent) -> Result<EventRecord, DirectoryError> {
        let row = sqlx::query_as::<_, EventRecord>(
            "INSERT INTO events (title, description, banner_url, date, end_date, venue, \
             is_online, event_type, community_id, venue_id, city_id, registration_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.banner_url)
        .bind(new.date)
        .bind(new.end_date)
        .bind(&new.venue)
        .bind(new.is_online)
        .bind(&new.event_type)
        .bind(new.community_id)
        .bind(new.venue_id)
        .bind(new.city_id)
        .bind(&new.registration_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Fetches a single event row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no live
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn fetch_event(&self, event_id: Uuid) -> Result<EventRecord, DirectoryError> {
        sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DirectoryError::EventNotFound(event_id))
    }

    /// Fetches the fetch-before-write projection of an event: status,
    /// aggregate references, and dates.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no live
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn fetch_event_header(&self, event_id: Uuid) -> Result<EventHeader, DirectoryError> {
        sqlx::query_as::<_, EventHeader>(
            "SELECT status, community_id, venue_id, date, end_date FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DirectoryError::EventNotFound(event_id))
    }

    /// Writes a new status, guarded on the status observed at fetch time.
    ///
    /// Returns `false` when zero rows matched, i.e. a concurrent writer
    /// changed (or deleted) the row between our read and this write.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn update_event_status_guarded(
        &self,
        event_id: Uuid,
        observed: EventStatus,
        new_status: EventStatus,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            "UPDATE events SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(new_status.as_str())
        .bind(event_id)
        .bind(observed.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes one live event row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no live
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn delete_event(&self, event_id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::EventNotFound(event_id));
        }
        Ok(())
    }

    /// Deletes a set of live event rows by id, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn delete_events(&self, event_ids: &[Uuid]) -> Result<u64, DirectoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ANY($1)")
            .bind(event_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists approved events that are upcoming or still running at `now`,
    /// joined with their community names, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn list_upcoming_approved(
        &self,
        now: DateTime<Utc>,
        filter: &EventFilter,
    ) -> Result<Vec<EventWithCommunity>, DirectoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT e.*, c.name AS community_name FROM events e \
             LEFT JOIN communities c ON c.id = e.community_id \
             WHERE e.status = 'approved' AND (e.date >= ",
        );
        qb.push_bind(now);
        qb.push(" OR (e.end_date >= ");
        qb.push_bind(now);
        qb.push(" AND e.date <= ");
        qb.push_bind(now);
        qb.push("))");

        if let Some(community_id) = filter.community_id {
            qb.push(" AND e.community_id = ");
            qb.push_bind(community_id);
        }
        if let Some(event_type) = &filter.event_type {
            qb.push(" AND e.event_type = ");
            qb.push_bind(event_type.clone());
        }
        if let Some(city_id) = filter.city_id {
            qb.push(" AND e.city_id = ");
            qb.push_bind(city_id);
        }
        qb.push(" ORDER BY e.date ASC");

        let rows = qb
            .build_query_as::<EventWithCommunity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Lists every live event for the admin view, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn list_all_events(&self) -> Result<Vec<EventWithCommunity>, DirectoryError> {
        let rows = sqlx::query_as::<_, EventWithCommunity>(
            "SELECT e.*, c.name AS community_name FROM events e \
             LEFT JOIN communities c ON c.id = e.community_id \
             ORDER BY e.date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Atomically bumps an event's registration-click counter.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no live
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn increment_registration_clicks(
        &self,
        event_id: Uuid,
    ) -> Result<i64, DirectoryError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE events SET registration_clicks = registration_clicks + 1 \
             WHERE id = $1 RETURNING registration_clicks",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DirectoryError::EventNotFound(event_id))
    }

    // ── Archival reads and writes ───────────────────────────────────────

    /// Selects the archival candidates of a batch sweep: approved events
    /// whose `end_date` is behind `now`, joined with community names.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn list_expired_approved(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<EventWithCommunity>, DirectoryError> {
        let rows = sqlx::query_as::<_, EventWithCommunity>(
            "SELECT e.*, c.name AS community_name FROM events e \
             LEFT JOIN communities c ON c.id = e.community_id \
             WHERE e.end_date < $1 AND e.status = 'approved'",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetches one event with its community name for single-event
    /// archival, regardless of status or expiry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no live
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn fetch_event_with_community(
        &self,
        event_id: Uuid,
    ) -> Result<EventWithCommunity, DirectoryError> {
        sqlx::query_as::<_, EventWithCommunity>(
            "SELECT e.*, c.name AS community_name FROM events e \
             LEFT JOIN communities c ON c.id = e.community_id \
             WHERE e.id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DirectoryError::EventNotFound(event_id))
    }

    /// Fetches the sponsors attached to any of the given events.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn sponsors_for_events(
        &self,
        event_ids: &[Uuid],
    ) -> Result<Vec<SponsorRecord>, DirectoryError> {
        let rows = sqlx::query_as::<_, SponsorRecord>(
            "SELECT * FROM sponsors WHERE event_id = ANY($1)",
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Bulk-inserts archive snapshots, skipping ids that already exist
    /// in the archive (crash-and-retry idempotency). Returns the number
    /// of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure; the
    /// statement is atomic, so a failure inserts nothing.
    pub async fn insert_archived(
        &self,
        snapshots: &[NewArchivedEvent],
    ) -> Result<u64, DirectoryError> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO archived_events (id, title, date, end_date, venue, is_online, \
             event_type, community_id, community_name, city_id, featured, banner_url, \
             registration_clicks, created_at, archived_at) ",
        );
        qb.push_values(snapshots, |mut b, snap| {
            b.push_bind(snap.id)
                .push_bind(&snap.title)
                .push_bind(snap.date)
                .push_bind(snap.end_date)
                .push_bind(&snap.venue)
                .push_bind(snap.is_online)
                .push_bind(&snap.event_type)
                .push_bind(snap.community_id)
                .push_bind(&snap.community_name)
                .push_bind(snap.city_id)
                .push_bind(snap.featured)
                .push_bind(&snap.banner_url)
                .push_bind(snap.registration_clicks)
                .push_bind(snap.created_at)
                .push_bind(snap.archived_at);
        });
        qb.push(" ON CONFLICT (id) DO NOTHING");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Lists archive rows, newest event date first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn list_archived(
        &self,
        filter: &ArchiveFilter,
    ) -> Result<Vec<ArchivedEventRecord>, DirectoryError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM archived_events WHERE TRUE");

        if let Some(city_id) = filter.city_id {
            qb.push(" AND city_id = ");
            qb.push_bind(city_id);
        }
        if let Some(community_id) = filter.community_id {
            qb.push(" AND community_id = ");
            qb.push_bind(community_id);
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ");
            qb.push_bind(featured);
        }
        qb.push(" ORDER BY date DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }

        let rows = qb
            .build_query_as::<ArchivedEventRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Applies admin curation to an archive row. Only `featured` and
    /// `registration_clicks` are mutable after archival.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] if the id has no
    /// archive row, or [`DirectoryError::Storage`] on database failure.
    pub async fn update_archived(
        &self,
        event_id: Uuid,
        featured: Option<bool>,
        registration_clicks: Option<i64>,
    ) -> Result<ArchivedEventRecord, DirectoryError> {
        sqlx::query_as::<_, ArchivedEventRecord>(
            "UPDATE archived_events SET \
             featured = COALESCE($2, featured), \
             registration_clicks = COALESCE($3, registration_clicks) \
             WHERE id = $1 RETURNING *",
        )
        .bind(event_id)
        .bind(featured)
        .bind(registration_clicks)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DirectoryError::EventNotFound(event_id))
    }

    // ── Communities, venues, leaderboards ───────────────────────────────

    /// Fetches one community row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CommunityNotFound`] if the id has no
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn fetch_community(
        &self,
        community_id: Uuid,
    ) -> Result<CommunityRecord, DirectoryError> {
        sqlx::query_as::<_, CommunityRecord>("SELECT * FROM communities WHERE id = $1")
            .bind(community_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DirectoryError::CommunityNotFound(community_id))
    }

    /// Deletes a community row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CommunityNotFound`] if the id has no
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn delete_community(&self, community_id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query("DELETE FROM communities WHERE id = $1")
            .bind(community_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::CommunityNotFound(community_id));
        }
        Ok(())
    }

    /// Re-points every event owned by `from_community` to `to_community`,
    /// returning how many rows moved.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn reassign_events(
        &self,
        from_community: Uuid,
        to_community: Uuid,
    ) -> Result<u64, DirectoryError> {
        let result =
            sqlx::query("UPDATE events SET community_id = $1 WHERE community_id = $2")
                .bind(to_community)
                .bind(from_community)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Counts a community's approved live events (used by the optional
    /// merge reconciliation step).
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn count_approved_events(
        &self,
        community_id: Uuid,
    ) -> Result<i64, DirectoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE community_id = $1 AND status = 'approved'",
        )
        .bind(community_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Top approved communities by event count, best first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn community_leaderboard(
        &self,
        city_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<CommunityRecord>, DirectoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT * FROM communities \
             WHERE verification_status = 'approved' AND event_count > 0",
        );
        if let Some(city_id) = city_id {
            qb.push(" AND city_id = ");
            qb.push_bind(city_id);
        }
        qb.push(" ORDER BY event_count DESC LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build_query_as::<CommunityRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Top approved venues by event count, best first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn venue_leaderboard(
        &self,
        city_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<VenueRecord>, DirectoryError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT * FROM venues \
             WHERE verification_status = 'approved' AND event_count > 0",
        );
        if let Some(city_id) = city_id {
            qb.push(" AND city_id = ");
            qb.push_bind(city_id);
        }
        qb.push(" ORDER BY event_count DESC LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build_query_as::<VenueRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // ── Duplicate candidates ────────────────────────────────────────────

    /// Lists pending duplicate candidates, highest similarity first
    /// (review priority order).
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn pending_candidates(
        &self,
    ) -> Result<Vec<DuplicateCandidateRecord>, DirectoryError> {
        let rows = sqlx::query_as::<_, DuplicateCandidateRecord>(
            "SELECT * FROM admin_community_duplicates \
             WHERE admin_status = 'pending' ORDER BY similarity_score DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetches one duplicate candidate.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CandidateNotFound`] if the id has no
    /// row, or [`DirectoryError::Storage`] on database failure.
    pub async fn fetch_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<DuplicateCandidateRecord, DirectoryError> {
        sqlx::query_as::<_, DuplicateCandidateRecord>(
            "SELECT * FROM admin_community_duplicates WHERE id = $1",
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DirectoryError::CandidateNotFound(candidate_id))
    }

    /// Moves a candidate out of `pending` into a terminal status with
    /// reviewer attribution and notes. Guarded on `admin_status =
    /// 'pending'` so the first reviewer wins; returns `false` when a
    /// concurrent reviewer already resolved the candidate.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn resolve_candidate_guarded(
        &self,
        candidate_id: Uuid,
        status: CandidateStatus,
        reviewed_by: &str,
        notes: &str,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            "UPDATE admin_community_duplicates SET \
             admin_status = $1, reviewed_by = $2, reviewed_at = NOW(), admin_notes = $3 \
             WHERE id = $4 AND admin_status = 'pending'",
        )
        .bind(status.as_str())
        .bind(reviewed_by)
        .bind(notes)
        .bind(candidate_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
