//! Duplicate-community resolution workflow.
//!
//! Candidates arrive from an external similarity detector in `pending`;
//! an admin resolves each one exactly once with merge, keep-separate,
//! or investigate. The merge sequence is strictly ordered: events are
//! reassigned and confirmed before the duplicate community is deleted,
//! and the community is deleted before the candidate is resolved, so a
//! crash mid-sequence leaves events attributed to a community that still
//! exists.

use uuid::Uuid;

use crate::domain::{Aggregate, CandidateStatus, CounterAdjustment, Warning};
use crate::error::DirectoryError;
use crate::persistence::models::DuplicateCandidateRecord;
use crate::persistence::{AuditLog, CounterStore, DirectoryStore};

/// Audit note appended to a candidate when a merge is approved.
const MERGE_NOTE: &str = "MERGED: Confirmed same community. Events transferred.";

/// Audit note written when a candidate is kept separate.
const KEEP_SEPARATE_NOTE: &str =
    "REVIEWED: Determined to be different communities despite similarity.";

/// Appends `note` to any existing review notes with a `|` separator.
fn appended_note(existing: Option<&str>, note: &str) -> String {
    match existing {
        Some(prev) if !prev.trim().is_empty() => format!("{prev} | {note}"),
        _ => note.to_string(),
    }
}

/// Result of an approved merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Candidate that was resolved.
    pub candidate_id: Uuid,
    /// Community that absorbed the duplicate's events.
    pub original_community_id: Uuid,
    /// Community that was deleted.
    pub duplicate_community_id: Uuid,
    /// Events re-pointed from the duplicate to the original.
    pub reassigned_events: u64,
    /// Swallowed counter failures from the optional reconciliation step.
    pub warnings: Vec<Warning>,
}

/// Result of a keep-separate or investigate decision.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    /// Candidate that was resolved.
    pub candidate_id: Uuid,
    /// Terminal status the candidate now holds.
    pub status: CandidateStatus,
}

/// Orchestration layer for duplicate-candidate decisions.
///
/// The sole writer of `admin_status` transitions beyond `pending`. With
/// `reconcile_counts` enabled, a merge also transfers the duplicate's
/// approved-event count to the original community; by default counts are
/// left as-is, matching the observed behavior this service replaces.
#[derive(Debug, Clone)]
pub struct DuplicateService {
    store: DirectoryStore,
    counters: CounterStore,
    audit: AuditLog,
    reconcile_counts: bool,
}

impl DuplicateService {
    /// Creates a new `DuplicateService`.
    #[must_use]
    pub fn new(
        store: DirectoryStore,
        counters: CounterStore,
        audit: AuditLog,
        reconcile_counts: bool,
    ) -> Self {
        Self {
            store,
            counters,
            audit,
            reconcile_counts,
        }
    }

    /// Lists pending candidates in review-priority order (highest
    /// similarity first).
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn pending(&self) -> Result<Vec<DuplicateCandidateRecord>, DirectoryError> {
        self.store.pending_candidates().await
    }

    /// Merges the duplicate community into the original: reassigns every
    /// event, deletes the duplicate community, resolves the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CandidateNotFound`] for unknown ids,
    /// [`DirectoryError::Conflict`] when the candidate is no longer
    /// pending, or [`DirectoryError::Storage`] when the reassignment,
    /// community delete, or candidate update fails.
    pub async fn merge(
        &self,
        candidate_id: Uuid,
        reviewed_by: &str,
    ) -> Result<MergeOutcome, DirectoryError> {
        let candidate = self.fetch_pending(candidate_id).await?;

        // Tallied before reassignment so the reconciliation step knows
        // how many approved events actually moved.
        let moved_approved = if self.reconcile_counts {
            self.store
                .count_approved_events(candidate.duplicate_community_id)
                .await?
        } else {
            0
        };

        let reassigned_events = self
            .store
            .reassign_events(
                candidate.duplicate_community_id,
                candidate.original_community_id,
            )
            .await?;

        // The delete must not precede a confirmed reassignment; a crash
        // before this point leaves both communities intact. A duplicate
        // already gone means an interrupted earlier merge; converge.
        match self
            .store
            .delete_community(candidate.duplicate_community_id)
            .await
        {
            Ok(()) => {}
            Err(DirectoryError::CommunityNotFound(id)) => {
                tracing::warn!(community_id = %id, "duplicate community already deleted; continuing");
            }
            Err(err) => return Err(err),
        }

        let notes = appended_note(candidate.admin_notes.as_deref(), MERGE_NOTE);
        let resolved = self
            .store
            .resolve_candidate_guarded(
                candidate_id,
                CandidateStatus::MergeApproved,
                reviewed_by,
                &notes,
            )
            .await?;
        if !resolved {
            return Err(DirectoryError::Conflict(format!(
                "candidate {candidate_id} was resolved by another reviewer"
            )));
        }

        let mut warnings = Vec::new();
        if self.reconcile_counts {
            self.reconcile_merged_counts(
                candidate.original_community_id,
                moved_approved,
                &mut warnings,
            )
            .await;
        }

        tracing::info!(
            %candidate_id,
            original = %candidate.original_community_id,
            duplicate = %candidate.duplicate_community_id,
            reassigned_events,
            "communities merged"
        );

        Ok(MergeOutcome {
            candidate_id,
            original_community_id: candidate.original_community_id,
            duplicate_community_id: candidate.duplicate_community_id,
            reassigned_events,
            warnings,
        })
    }

    /// Marks a candidate as two genuinely distinct communities.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CandidateNotFound`] for unknown ids,
    /// [`DirectoryError::Conflict`] when the candidate is no longer
    /// pending, or [`DirectoryError::Storage`] on database failure.
    pub async fn keep_separate(
        &self,
        candidate_id: Uuid,
        reviewed_by: &str,
    ) -> Result<ResolutionOutcome, DirectoryError> {
        self.fetch_pending(candidate_id).await?;

        let resolved = self
            .store
            .resolve_candidate_guarded(
                candidate_id,
                CandidateStatus::KeepSeparate,
                reviewed_by,
                KEEP_SEPARATE_NOTE,
            )
            .await?;
        if !resolved {
            return Err(DirectoryError::Conflict(format!(
                "candidate {candidate_id} was resolved by another reviewer"
            )));
        }

        tracing::info!(%candidate_id, "candidate kept separate");
        Ok(ResolutionOutcome {
            candidate_id,
            status: CandidateStatus::KeepSeparate,
        })
    }

    /// Parks a candidate for further investigation with admin notes.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] for blank notes,
    /// [`DirectoryError::CandidateNotFound`] for unknown ids,
    /// [`DirectoryError::Conflict`] when the candidate is no longer
    /// pending, or [`DirectoryError::Storage`] on database failure.
    pub async fn investigate(
        &self,
        candidate_id: Uuid,
        reviewed_by: &str,
        notes: &str,
    ) -> Result<ResolutionOutcome, DirectoryError> {
        if notes.trim().is_empty() {
            return Err(DirectoryError::InvalidRequest(
                "investigation notes must not be empty".to_string(),
            ));
        }

        self.fetch_pending(candidate_id).await?;

        let resolved = self
            .store
            .resolve_candidate_guarded(
                candidate_id,
                CandidateStatus::NeedsInvestigation,
                reviewed_by,
                notes,
            )
            .await?;
        if !resolved {
            return Err(DirectoryError::Conflict(format!(
                "candidate {candidate_id} was resolved by another reviewer"
            )));
        }

        tracing::info!(%candidate_id, "candidate parked for investigation");
        Ok(ResolutionOutcome {
            candidate_id,
            status: CandidateStatus::NeedsInvestigation,
        })
    }

    /// Fetches a candidate, rejecting ones already resolved.
    async fn fetch_pending(
        &self,
        candidate_id: Uuid,
    ) -> Result<DuplicateCandidateRecord, DirectoryError> {
        let candidate = self.store.fetch_candidate(candidate_id).await?;
        if candidate.admin_status.is_terminal() {
            return Err(DirectoryError::Conflict(format!(
                "candidate {candidate_id} already resolved as '{}'",
                candidate.admin_status
            )));
        }
        Ok(candidate)
    }

    /// Transfers the moved approved-event count to the absorbing
    /// community, one increment per event, swallowing failures.
    async fn reconcile_merged_counts(
        &self,
        original_community_id: Uuid,
        moved_approved: i64,
        warnings: &mut Vec<Warning>,
    ) {
        for _ in 0..moved_approved {
            if let Err(err) = self.counters.increment_community(original_community_id).await {
                tracing::warn!(
                    community_id = %original_community_id,
                    error = %err,
                    "merge reconciliation increment failed; continuing"
                );
                let detail = format!(
                    "increment of community counter {original_community_id} failed during merge reconciliation: {err}"
                );
                if let Err(audit_err) = self
                    .audit
                    .record_error(crate::persistence::audit::ACTION_COUNTER_UPDATE, &detail)
                    .await
                {
                    tracing::warn!(error = %audit_err, "audit write for counter failure also failed");
                }
                warnings.push(Warning::CounterUpdate {
                    aggregate: Aggregate::Community,
                    id: original_community_id,
                    adjustment: CounterAdjustment::Increment,
                    reason: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn merge_note_appends_to_existing_notes() {
        let notes = appended_note(Some("Detected 2026-08-01."), MERGE_NOTE);
        assert_eq!(
            notes,
            "Detected 2026-08-01. | MERGED: Confirmed same community. Events transferred."
        );
    }

    #[test]
    fn merge_note_stands_alone_without_prior_notes() {
        assert_eq!(appended_note(None, MERGE_NOTE), MERGE_NOTE);
        assert_eq!(appended_note(Some("   "), MERGE_NOTE), MERGE_NOTE);
    }

    #[test]
    fn keep_separate_note_is_fixed() {
        assert!(KEEP_SEPARATE_NOTE.starts_with("REVIEWED:"));
    }
}
