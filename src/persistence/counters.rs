//! Atomic increment/decrement primitives for denormalized event counts.
//!
//! Both the lifecycle state machine and the archival engine mutate
//! `communities.event_count` and `venues.event_count`; every mutation
//! goes through this store as a single atomic `UPDATE` at the database,
//! never a read-modify-write in application code. The store has no retry
//! policy; callers decide how to react to failure.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Aggregate, CounterAdjustment};
use crate::error::DirectoryError;

/// Atomic counter primitives over community and venue aggregates.
///
/// Each primitive either succeeds or reports failure; an update that
/// matches no row is an error, never a silent no-op. Decrements floor
/// at zero.
#[derive(Debug, Clone)]
pub struct CounterStore {
    pool: PgPool,
}

impl CounterStore {
    /// Creates a new counter store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds one to a community's event count.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CommunityNotFound`] if the id matches
    /// no row, or [`DirectoryError::Storage`] on database failure.
    pub async fn increment_community(&self, community_id: Uuid) -> Result<(), DirectoryError> {
        let result =
            sqlx::query("UPDATE communities SET event_count = event_count + 1 WHERE id = $1")
                .bind(community_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::CommunityNotFound(community_id));
        }
        Ok(())
    }

    /// Subtracts one from a community's event count, flooring at zero.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CommunityNotFound`] if the id matches
    /// no row, or [`DirectoryError::Storage`] on database failure.
    pub async fn decrement_community(&self, community_id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            "UPDATE communities SET event_count = GREATEST(event_count - 1, 0) WHERE id = $1",
        )
        .bind(community_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::CommunityNotFound(community_id));
        }
        Ok(())
    }

    /// Adds one to a venue's event count.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the update fails or
    /// matches no row.
    pub async fn increment_venue(&self, venue_id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query("UPDATE venues SET event_count = event_count + 1 WHERE id = $1")
            .bind(venue_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::Storage(format!(
                "venue {venue_id} missing; counter update matched no row"
            )));
        }
        Ok(())
    }

    /// Subtracts one from a venue's event count, flooring at zero.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the update fails or
    /// matches no row.
    pub async fn decrement_venue(&self, venue_id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            "UPDATE venues SET event_count = GREATEST(event_count - 1, 0) WHERE id = $1",
        )
        .bind(venue_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::Storage(format!(
                "venue {venue_id} missing; counter update matched no row"
            )));
        }
        Ok(())
    }

    /// Dispatches to the matching primitive for an aggregate/direction
    /// pair. Convenience for callers that plan side effects with
    /// [`counter_adjustment`](crate::domain::counter_adjustment).
    ///
    /// # Errors
    ///
    /// Propagates the underlying primitive's error.
    pub async fn apply(
        &self,
        aggregate: Aggregate,
        adjustment: CounterAdjustment,
        id: Uuid,
    ) -> Result<(), DirectoryError> {
        match (aggregate, adjustment) {
            (Aggregate::Community, CounterAdjustment::Increment) => {
                self.increment_community(id).await
            }
            (Aggregate::Community, CounterAdjustment::Decrement) => {
                self.decrement_community(id).await
            }
            (Aggregate::Venue, CounterAdjustment::Increment) => self.increment_venue(id).await,
            (Aggregate::Venue, CounterAdjustment::Decrement) => self.decrement_venue(id).await,
        }
    }
}
