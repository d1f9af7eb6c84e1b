//! Event lifecycle orchestration: status transitions, deletion, and the
//! counter side effects both imply.
//!
//! Every mutation follows the same shape: fetch the event header first
//! (the read happens-before the write), validate, write guarded on the
//! observed status, then apply counter side effects with the swallow
//! policy: counter failures become warnings, never rollbacks.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Aggregate, CounterAdjustment, EventStatus, Warning, counter_adjustment,
};
use crate::error::DirectoryError;
use crate::persistence::audit::ACTION_COUNTER_UPDATE;
use crate::persistence::models::{EventRecord, NewEvent};
use crate::persistence::{AuditLog, CounterStore, DirectoryStore};

/// Result of a status transition, carrying any swallowed counter
/// failures.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Event that transitioned.
    pub event_id: Uuid,
    /// Status observed before the write.
    pub previous: EventStatus,
    /// Status after the write.
    pub status: EventStatus,
    /// Non-fatal counter failures.
    pub warnings: Vec<Warning>,
}

/// Result of an event deletion.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// Event that was deleted.
    pub event_id: Uuid,
    /// Whether the event was approved (and therefore uncounted) at
    /// deletion time.
    pub was_approved: bool,
    /// Non-fatal counter failures.
    pub warnings: Vec<Warning>,
}

/// Validates user-supplied fields of a new event submission.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidRequest`] when the title or event
/// type is blank, or the end date precedes the start date.
pub fn validate_new_event(new: &NewEvent) -> Result<(), DirectoryError> {
    if new.title.trim().is_empty() {
        return Err(DirectoryError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    if new.event_type.trim().is_empty() {
        return Err(DirectoryError::InvalidRequest(
            "event_type must not be empty".to_string(),
        ));
    }
    if let Some(end_date) = new.end_date
        && end_date < new.date
    {
        return Err(DirectoryError::InvalidRequest(
            "end_date must not precede date".to_string(),
        ));
    }
    Ok(())
}

/// Orchestration layer for event lifecycle operations.
///
/// Owns handles to the [`DirectoryStore`] for row access, the
/// [`CounterStore`] for aggregate maintenance, and the [`AuditLog`] for
/// recording swallowed counter failures.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    store: DirectoryStore,
    counters: CounterStore,
    audit: AuditLog,
}

impl LifecycleService {
    /// Creates a new `LifecycleService`.
    #[must_use]
    pub fn new(store: DirectoryStore, counters: CounterStore, audit: AuditLog) -> Self {
        Self {
            store,
            counters,
            audit,
        }
    }

    /// Creates a new event in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] on invalid fields or
    /// [`DirectoryError::Storage`] on database failure.
    pub async fn create_event(&self, new: &NewEvent) -> Result<EventRecord, DirectoryError> {
        validate_new_event(new)?;
        let event = self.store.create_event(new).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event submitted");
        Ok(event)
    }

    /// Transitions an event to `new_status`, adjusting community and
    /// venue counters when the transition crosses the approved boundary.
    ///
    /// The status read happens-before the guarded write; a concurrent
    /// writer that gets there first turns this call into a conflict
    /// instead of a lost update. Counter failures do not roll back the
    /// transition; they come back as warnings on the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] for unknown ids,
    /// [`DirectoryError::InvalidTransition`] for moves outside the
    /// transition table, [`DirectoryError::Conflict`] when a concurrent
    /// writer changed the status first, or [`DirectoryError::Storage`]
    /// on database failure.
    pub async fn set_status(
        &self,
        event_id: Uuid,
        new_status: EventStatus,
    ) -> Result<TransitionOutcome, DirectoryError> {
        let header = self.store.fetch_event_header(event_id).await?;

        let has_passed = header.has_passed(Utc::now());
        if !header.status.can_transition_to(new_status, has_passed) {
            return Err(DirectoryError::InvalidTransition {
                from: header.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self
            .store
            .update_event_status_guarded(event_id, header.status, new_status)
            .await?;
        if !updated {
            return Err(DirectoryError::Conflict(format!(
                "event {event_id} was modified concurrently; re-read and retry"
            )));
        }

        let mut warnings = Vec::new();
        if let Some(adjustment) = counter_adjustment(header.status, new_status) {
            self.adjust_counters(header.community_id, header.venue_id, adjustment, &mut warnings)
                .await;
        }

        tracing::info!(
            %event_id,
            from = %header.status,
            to = %new_status,
            warnings = warnings.len(),
            "event status updated"
        );

        Ok(TransitionOutcome {
            event_id,
            previous: header.status,
            status: new_status,
            warnings,
        })
    }

    /// Deletes an event, decrementing both counters if it was approved.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] for unknown ids or
    /// [`DirectoryError::Storage`] on database failure. Counter failures
    /// are swallowed into warnings.
    pub async fn delete_event(&self, event_id: Uuid) -> Result<DeleteOutcome, DirectoryError> {
        let header = self.store.fetch_event_header(event_id).await?;

        self.store.delete_event(event_id).await?;

        let was_approved = header.status == EventStatus::Approved;
        let mut warnings = Vec::new();
        if was_approved {
            self.adjust_counters(
                header.community_id,
                header.venue_id,
                CounterAdjustment::Decrement,
                &mut warnings,
            )
            .await;
        }

        tracing::info!(%event_id, was_approved, "event deleted");

        Ok(DeleteOutcome {
            event_id,
            was_approved,
            warnings,
        })
    }

    /// Atomically bumps an event's registration-click counter.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] for unknown ids or
    /// [`DirectoryError::Storage`] on database failure.
    pub async fn record_registration_click(&self, event_id: Uuid) -> Result<i64, DirectoryError> {
        self.store.increment_registration_clicks(event_id).await
    }

    /// Applies one adjustment to both aggregates of an event, exactly
    /// once each, swallowing failures into `warnings`.
    async fn adjust_counters(
        &self,
        community_id: Option<Uuid>,
        venue_id: Option<Uuid>,
        adjustment: CounterAdjustment,
        warnings: &mut Vec<Warning>,
    ) {
        if let Some(community_id) = community_id {
            if let Err(err) = self
                .counters
                .apply(Aggregate::Community, adjustment, community_id)
                .await
            {
                self.note_counter_failure(
                    Aggregate::Community,
                    community_id,
                    adjustment,
                    &err,
                    warnings,
                )
                .await;
            }
        }

        if let Some(venue_id) = venue_id {
            if let Err(err) = self
                .counters
                .apply(Aggregate::Venue, adjustment, venue_id)
                .await
            {
                self.note_counter_failure(Aggregate::Venue, venue_id, adjustment, &err, warnings)
                    .await;
            }
        }
    }

    /// Logs a swallowed counter failure, records it in the audit sink,
    /// and attaches it to the outcome.
    async fn note_counter_failure(
        &self,
        aggregate: Aggregate,
        id: Uuid,
        adjustment: CounterAdjustment,
        err: &DirectoryError,
        warnings: &mut Vec<Warning>,
    ) {
        tracing::warn!(
            aggregate = aggregate.as_str(),
            %id,
            adjustment = adjustment.as_str(),
            error = %err,
            "counter update failed; continuing"
        );

        let detail = format!(
            "{} of {} counter {id} failed: {err}",
            adjustment.as_str(),
            aggregate.as_str()
        );
        if let Err(audit_err) = self.audit.record_error(ACTION_COUNTER_UPDATE, &detail).await {
            tracing::warn!(error = %audit_err, "audit write for counter failure also failed");
        }

        warnings.push(Warning::CounterUpdate {
            aggregate,
            id,
            adjustment,
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn ts(text: &str) -> DateTime<Utc> {
        text.parse().ok().unwrap_or_else(|| panic!("bad timestamp"))
    }

    fn sample_submission() -> NewEvent {
        NewEvent {
            title: "Systems Reading Group".to_string(),
            description: None,
            banner_url: None,
            date: ts("2026-09-01T18:00:00Z"),
            end_date: Some(ts("2026-09-01T20:00:00Z")),
            venue: None,
            is_online: true,
            event_type: "Meetup".to_string(),
            community_id: None,
            venue_id: None,
            city_id: None,
            registration_url: None,
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_new_event(&sample_submission()).is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut new = sample_submission();
        new.title = "   ".to_string();
        assert!(matches!(
            validate_new_event(&new),
            Err(DirectoryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn blank_event_type_is_rejected() {
        let mut new = sample_submission();
        new.event_type = String::new();
        assert!(matches!(
            validate_new_event(&new),
            Err(DirectoryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut new = sample_submission();
        new.end_date = Some(ts("2026-09-01T17:00:00Z"));
        assert!(matches!(
            validate_new_event(&new),
            Err(DirectoryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn open_ended_submission_passes() {
        let mut new = sample_submission();
        new.end_date = None;
        assert!(validate_new_event(&new).is_ok());
    }
}
