//! Admin review states for duplicate-community candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Review status of a [`DuplicateCandidate`](crate::persistence::models::DuplicateCandidateRecord).
///
/// Candidates are created externally in `Pending`; the resolution
/// workflow is the sole writer of the three terminal states, and a
/// terminal candidate is never reopened through this workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Confirmed the same community; events transferred, duplicate deleted.
    MergeApproved,
    /// Confirmed distinct communities despite the similarity score.
    KeepSeparate,
    /// Parked with admin notes for a closer look.
    NeedsInvestigation,
}

impl CandidateStatus {
    /// Returns the snake_case storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::MergeApproved => "merge_approved",
            Self::KeepSeparate => "keep_separate",
            Self::NeedsInvestigation => "needs_investigation",
        }
    }

    /// Whether this status ends the review (anything but `Pending`).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "merge_approved" => Ok(Self::MergeApproved),
            "keep_separate" => Ok(Self::KeepSeparate),
            "needs_investigation" => Ok(Self::NeedsInvestigation),
            other => Err(format!("unknown candidate status: {other}")),
        }
    }
}

impl TryFrom<String> for CandidateStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!CandidateStatus::Pending.is_terminal());
        assert!(CandidateStatus::MergeApproved.is_terminal());
        assert!(CandidateStatus::KeepSeparate.is_terminal());
        assert!(CandidateStatus::NeedsInvestigation.is_terminal());
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [
            CandidateStatus::Pending,
            CandidateStatus::MergeApproved,
            CandidateStatus::KeepSeparate,
            CandidateStatus::NeedsInvestigation,
        ] {
            let parsed: Result<CandidateStatus, _> = status.as_str().parse();
            assert_eq!(parsed, Ok(status));
        }
    }
}
