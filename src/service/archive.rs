//! Archival engine: moves expired events out of the live table into the
//! immutable archive.
//!
//! Both entry points, the scheduled batch sweep and the single-event
//! admin path, share one procedure: cleanup assets (best effort),
//! snapshot, bulk-insert into the archive, count, delete. The insert
//! happens strictly before any counter mutation or deletion so a failure
//! can never lose events, and the archive's primary key makes retried
//! runs idempotent: pre-existing ids are skipped, not duplicated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::assets::AssetCleaner;
use crate::domain::{Aggregate, CounterAdjustment, EventStatus, Warning};
use crate::error::DirectoryError;
use crate::persistence::audit::{ACTION_COUNTER_UPDATE, ACTION_EVENT_CLEANUP};
use crate::persistence::models::{EventWithCommunity, NewArchivedEvent};
use crate::persistence::{AuditLog, CounterStore, DirectoryStore};

/// Structured result of an archival run.
///
/// Batch runs report aggregate counts even when secondary steps failed;
/// the swallowed failures ride along as warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Live rows removed by this run.
    pub deleted_events: u64,
    /// Snapshots actually inserted (pre-existing archive ids are
    /// skipped, so this can be lower after a crash-and-retry).
    pub archived_events: u64,
    /// Events that were approved at fetch time and therefore counted
    /// toward their aggregates.
    pub successful_events: u64,
    /// Distinct communities whose counters this run touched.
    pub updated_communities: u64,
    /// Distinct venues whose counters this run touched.
    pub updated_venues: u64,
    /// Swallowed cleanup and counter failures.
    pub warnings: Vec<Warning>,
}

/// Tallies how many of the given `(community_id, venue_id)` pairs refer
/// to each aggregate, for per-aggregate batched increments.
fn tally_aggregates<I>(refs: I) -> (HashMap<Uuid, u64>, HashMap<Uuid, u64>)
where
    I: IntoIterator<Item = (Option<Uuid>, Option<Uuid>)>,
{
    let mut communities: HashMap<Uuid, u64> = HashMap::new();
    let mut venues: HashMap<Uuid, u64> = HashMap::new();
    for (community_id, venue_id) in refs {
        if let Some(id) = community_id {
            *communities.entry(id).or_insert(0) += 1;
        }
        if let Some(id) = venue_id {
            *venues.entry(id).or_insert(0) += 1;
        }
    }
    (communities, venues)
}

/// Orchestration layer for event archival.
///
/// With `award_counts` disabled (the default), archival leaves the
/// denormalized counters untouched: an approved event was counted when
/// it entered the approved state, and archiving it preserves that
/// attribution. Enabling the flag restores the legacy behavior of
/// awarding one increment per archived approved event.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    store: DirectoryStore,
    counters: CounterStore,
    audit: AuditLog,
    cleaner: Arc<dyn AssetCleaner>,
    award_counts: bool,
}

impl ArchiveService {
    /// Creates a new `ArchiveService`.
    #[must_use]
    pub fn new(
        store: DirectoryStore,
        counters: CounterStore,
        audit: AuditLog,
        cleaner: Arc<dyn AssetCleaner>,
        award_counts: bool,
    ) -> Self {
        Self {
            store,
            counters,
            audit,
            cleaner,
            award_counts,
        }
    }

    /// Batch sweep: archives every approved event whose `end_date` is
    /// behind `now`. Zero candidates is a valid, successful no-op.
    ///
    /// The run, successful or failed, is recorded in the audit log
    /// under the `event_cleanup` action.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] when the candidate fetch, the
    /// archive insert, or the live delete fails. Cleanup and counter
    /// failures are swallowed into warnings.
    pub async fn archive_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, DirectoryError> {
        let outcome = self.sweep(now).await;

        match &outcome {
            Ok(report) => {
                let payload = serde_json::json!(report);
                if let Err(err) = self.audit.record_result(ACTION_EVENT_CLEANUP, &payload).await {
                    tracing::warn!(error = %err, "failed to record sweep result in audit log");
                }
            }
            Err(err) => {
                if let Err(audit_err) = self
                    .audit
                    .record_error(ACTION_EVENT_CLEANUP, &err.to_string())
                    .await
                {
                    tracing::warn!(error = %audit_err, "failed to record sweep error in audit log");
                }
            }
        }

        outcome
    }

    /// Archives one specific event regardless of its status or expiry
    /// (the admin-triggered immediate path).
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EventNotFound`] when no live row has
    /// the id, and [`DirectoryError::Storage`] when the archive insert
    /// or live delete fails.
    pub async fn archive_one(&self, event_id: Uuid) -> Result<SweepReport, DirectoryError> {
        let source = self.store.fetch_event_with_community(event_id).await?;
        let report = self.archive_batch(vec![source]).await?;
        tracing::info!(%event_id, "event archived on demand");
        Ok(report)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, DirectoryError> {
        let candidates = self.store.list_expired_approved(now).await?;
        if candidates.is_empty() {
            tracing::info!("no expired events to archive");
            return Ok(SweepReport::default());
        }

        tracing::info!(candidates = candidates.len(), "archival sweep starting");
        self.archive_batch(candidates).await
    }

    /// The shared procedure for a batch or a singleton set of events.
    async fn archive_batch(
        &self,
        sources: Vec<EventWithCommunity>,
    ) -> Result<SweepReport, DirectoryError> {
        if sources.is_empty() {
            return Ok(SweepReport::default());
        }

        let event_ids: Vec<Uuid> = sources.iter().map(|s| s.event.id).collect();
        let mut warnings = Vec::new();

        // Step 2: best-effort asset cleanup, one call per attached asset.
        let sponsors = self.store.sponsors_for_events(&event_ids).await?;
        for sponsor in &sponsors {
            if let Some(url) = &sponsor.banner_url {
                self.cleanup_asset(url, &mut warnings).await;
            }
        }

        // Step 3–4: snapshot, then insert before anything is mutated.
        let archived_at = Utc::now();
        let snapshots: Vec<NewArchivedEvent> = sources
            .iter()
            .map(|source| NewArchivedEvent::from_live(source, archived_at))
            .collect();
        let archived_events = self.store.insert_archived(&snapshots).await?;
        if archived_events < snapshots.len() as u64 {
            tracing::warn!(
                skipped = snapshots.len() as u64 - archived_events,
                "archive ids already present; skipped (retry after interrupted run)"
            );
        }

        // Step 5: tally the events that were approved at fetch time.
        // Counters are only awarded when configured to; otherwise the
        // events were already counted at approval and keep that
        // attribution through archival.
        let (community_tally, venue_tally) = tally_aggregates(
            sources
                .iter()
                .filter(|s| s.event.status == EventStatus::Approved)
                .map(|s| (s.event.community_id, s.event.venue_id)),
        );
        let successful_events = sources
            .iter()
            .filter(|s| s.event.status == EventStatus::Approved)
            .count() as u64;

        let (updated_communities, updated_venues) = if self.award_counts {
            for (&community_id, &count) in &community_tally {
                for _ in 0..count {
                    if let Err(err) = self.counters.increment_community(community_id).await {
                        self.note_counter_failure(
                            Aggregate::Community,
                            community_id,
                            &err,
                            &mut warnings,
                        )
                        .await;
                    }
                }
            }
            for (&venue_id, &count) in &venue_tally {
                for _ in 0..count {
                    if let Err(err) = self.counters.increment_venue(venue_id).await {
                        self.note_counter_failure(Aggregate::Venue, venue_id, &err, &mut warnings)
                            .await;
                    }
                }
            }
            (community_tally.len() as u64, venue_tally.len() as u64)
        } else {
            (0, 0)
        };

        // Step 6: remove the live rows. A failure here is fatal; events
        // must not live in both tables.
        let deleted_events = self.store.delete_events(&event_ids).await?;

        tracing::info!(
            deleted_events,
            archived_events,
            successful_events,
            warnings = warnings.len(),
            "archival batch finished"
        );

        Ok(SweepReport {
            deleted_events,
            archived_events,
            successful_events,
            updated_communities,
            updated_venues,
            warnings,
        })
    }

    /// Deletes one stored asset, swallowing failure into a warning.
    async fn cleanup_asset(&self, url: &str, warnings: &mut Vec<Warning>) {
        if let Err(err) = self.cleaner.delete_asset(url).await {
            tracing::warn!(url, error = %err, "asset cleanup failed; continuing");

            let detail = format!("cleanup of asset {url} failed: {err}");
            if let Err(audit_err) = self
                .audit
                .record_error(crate::persistence::audit::ACTION_ASSET_CLEANUP, &detail)
                .await
            {
                tracing::warn!(error = %audit_err, "audit write for cleanup failure also failed");
            }

            warnings.push(Warning::AssetCleanup {
                url: url.to_string(),
                reason: err.to_string(),
            });
        }
    }

    /// Logs and audits a swallowed counter failure during archival.
    async fn note_counter_failure(
        &self,
        aggregate: Aggregate,
        id: Uuid,
        err: &DirectoryError,
        warnings: &mut Vec<Warning>,
    ) {
        tracing::warn!(
            aggregate = aggregate.as_str(),
            %id,
            error = %err,
            "counter update failed during archival; continuing"
        );

        let detail = format!(
            "increment of {} counter {id} failed during archival: {err}",
            aggregate.as_str()
        );
        if let Err(audit_err) = self.audit.record_error(ACTION_COUNTER_UPDATE, &detail).await {
            tracing::warn!(error = %audit_err, "audit write for counter failure also failed");
        }

        warnings.push(Warning::CounterUpdate {
            aggregate,
            id,
            adjustment: CounterAdjustment::Increment,
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_per_aggregate() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let v1 = Uuid::new_v4();

        let (communities, venues) = tally_aggregates(vec![
            (Some(c1), Some(v1)),
            (Some(c1), None),
            (Some(c2), Some(v1)),
            (None, None),
        ]);

        assert_eq!(communities.get(&c1), Some(&2));
        assert_eq!(communities.get(&c2), Some(&1));
        assert_eq!(communities.len(), 2);
        assert_eq!(venues.get(&v1), Some(&2));
        assert_eq!(venues.len(), 1);
    }

    #[test]
    fn tally_of_nothing_is_empty() {
        let (communities, venues) = tally_aggregates(Vec::new());
        assert!(communities.is_empty());
        assert!(venues.is_empty());
    }

    #[test]
    fn report_serializes_for_the_audit_log() {
        let report = SweepReport {
            deleted_events: 3,
            archived_events: 3,
            successful_events: 3,
            updated_communities: 2,
            updated_venues: 1,
            warnings: Vec::new(),
        };
        let json = serde_json::json!(report);
        assert_eq!(json.get("deleted_events").and_then(|v| v.as_u64()), Some(3));
        assert_eq!(
            json.get("updated_communities").and_then(|v| v.as_u64()),
            Some(2)
        );
    }
}
