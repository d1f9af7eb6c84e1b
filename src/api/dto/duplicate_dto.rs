//! Duplicate-resolution DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::CandidateStatus;
use crate::persistence::models::DuplicateCandidateRecord;
use crate::service::{MergeOutcome, ResolutionOutcome};

/// Reviewer attribution for merge and keep-separate decisions.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// Who is making the decision; defaults to `"admin"`.
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

impl ReviewRequest {
    /// The reviewer name to record.
    #[must_use]
    pub fn reviewer(&self) -> &str {
        self.reviewed_by.as_deref().unwrap_or("admin")
    }
}

/// Request body for `POST /duplicates/{id}/investigate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InvestigateRequest {
    /// Who is making the decision; defaults to `"admin"`.
    #[serde(default)]
    pub reviewed_by: Option<String>,
    /// Free-text investigation notes. Required.
    pub notes: String,
}

impl InvestigateRequest {
    /// The reviewer name to record.
    #[must_use]
    pub fn reviewer(&self) -> &str {
        self.reviewed_by.as_deref().unwrap_or("admin")
    }
}

/// A pending duplicate candidate as presented for review.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidateResponse {
    /// Candidate identifier.
    pub id: Uuid,
    /// Community presumed canonical.
    pub original_community_id: Uuid,
    /// Name snapshot of the canonical community.
    pub original_community_name: String,
    /// Community suspected to be a duplicate.
    pub duplicate_community_id: Uuid,
    /// Name snapshot of the suspected duplicate.
    pub duplicate_community_name: String,
    /// Overall similarity score.
    pub similarity_score: f64,
    /// Per-signal sub-scores.
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
    /// When the detector produced the candidate.
    pub detected_at: DateTime<Utc>,
}

impl From<DuplicateCandidateRecord> for CandidateResponse {
    fn from(record: DuplicateCandidateRecord) -> Self {
        Self {
            id: record.id,
            original_community_id: record.original_community_id,
            original_community_name: record.original_community_name,
            duplicate_community_id: record.duplicate_community_id,
            duplicate_community_name: record.duplicate_community_name,
            similarity_score: record.similarity_score,
            score_breakdown: record.score_breakdown,
            website_match: record.website_match,
            organizer_email_match: record.organizer_email_match,
            organizer_phone_match: record.organizer_phone_match,
            social_media_match: record.social_media_match,
            admin_status: record.admin_status,
            admin_notes: record.admin_notes,
            detected_at: record.detected_at,
        }
    }
}

/// Response body for `POST /duplicates/{id}/merge`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MergeResponse {
    /// Candidate that was resolved.
    pub candidate_id: Uuid,
    /// Community that absorbed the duplicate's events.
    pub original_community_id: Uuid,
    /// Community that was deleted.
    pub duplicate_community_id: Uuid,
    /// Events re-pointed to the original community.
    pub reassigned_events: u64,
    /// Terminal status of the candidate.
    pub status: CandidateStatus,
    /// Human-readable descriptions of swallowed counter failures.
    pub warnings: Vec<String>,
}

impl From<MergeOutcome> for MergeResponse {
    fn from(outcome: MergeOutcome) -> Self {
        Self {
            candidate_id: outcome.candidate_id,
            original_community_id: outcome.original_community_id,
            duplicate_community_id: outcome.duplicate_community_id,
            reassigned_events: outcome.reassigned_events,
            status: CandidateStatus::MergeApproved,
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Response body for keep-separate and investigate decisions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionResponse {
    /// Candidate that was resolved.
    pub candidate_id: Uuid,
    /// Terminal status of the candidate.
    pub status: CandidateStatus,
}

impl From<ResolutionOutcome> for ResolutionResponse {
    fn from(outcome: ResolutionOutcome) -> Self {
        Self {
            candidate_id: outcome.candidate_id,
            status: outcome.status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn reviewer_defaults_to_admin() {
        let req = ReviewRequest { reviewed_by: None };
        assert_eq!(req.reviewer(), "admin");

        let named = ReviewRequest {
            reviewed_by: Some("sam".to_string()),
        };
        assert_eq!(named.reviewer(), "sam");
    }
}
