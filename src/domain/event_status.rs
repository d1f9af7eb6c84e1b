//! Event lifecycle states and transition rules.
//!
//! [`EventStatus`] is the state machine at the heart of the directory:
//! only approved events count toward community and venue totals, so every
//! transition across the approved boundary carries a counter side effect.
//! The transition table itself is pure and lives here; the side effects
//! are applied by the lifecycle service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Moderation status of a live event.
///
/// Stored as lowercase text in the `events.status` column. `Pending` is
/// the initial state; deletion and archival are out-of-band terminal
/// operations rather than status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Submitted but not yet reviewed.
    Pending,
    /// Visible in the public listing and counted toward aggregates.
    Approved,
    /// Declined by a moderator.
    Rejected,
    /// Approved once, then withdrawn by the organizer or a moderator.
    Cancelled,
}

impl EventStatus {
    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `self → new` is a legal transition.
    ///
    /// `event_has_passed` gates reactivation: a cancelled event whose
    /// date is already behind us stays cancelled. Re-applying the current
    /// status is always accepted (idempotent write, no side effects).
    #[must_use]
    pub fn can_transition_to(self, new: Self, event_has_passed: bool) -> bool {
        if self == new {
            return true;
        }
        matches!(
            (self, new),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Cancelled)
                | (Self::Approved, Self::Rejected)
                | (Self::Rejected, Self::Approved)
        ) || (self == Self::Cancelled && new == Self::Approved && !event_has_passed)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown event status: {other}")),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Direction of a counter side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterAdjustment {
    /// The event entered the approved state: count it.
    Increment,
    /// The event left the approved state: uncount it.
    Decrement,
}

impl CounterAdjustment {
    /// Short tag used in warnings and audit entries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        }
    }
}

/// Computes the counter side effect of a `previous → new` transition.
///
/// Exactly one increment when crossing into `approved`, exactly one
/// decrement when leaving `approved` for `rejected` or `cancelled`, and
/// nothing for transitions that stay on one side of the boundary.
#[must_use]
pub fn counter_adjustment(previous: EventStatus, new: EventStatus) -> Option<CounterAdjustment> {
    if new == EventStatus::Approved && previous != EventStatus::Approved {
        Some(CounterAdjustment::Increment)
    } else if previous == EventStatus::Approved
        && matches!(new, EventStatus::Rejected | EventStatus::Cancelled)
    {
        Some(CounterAdjustment::Decrement)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(EventStatus::Pending.can_transition_to(EventStatus::Approved, false));
        assert!(EventStatus::Pending.can_transition_to(EventStatus::Rejected, false));
        assert!(!EventStatus::Pending.can_transition_to(EventStatus::Cancelled, false));
    }

    #[test]
    fn approved_can_be_cancelled_or_rejected() {
        assert!(EventStatus::Approved.can_transition_to(EventStatus::Cancelled, false));
        assert!(EventStatus::Approved.can_transition_to(EventStatus::Rejected, false));
        assert!(!EventStatus::Approved.can_transition_to(EventStatus::Pending, false));
    }

    #[test]
    fn rejected_can_be_reapproved() {
        assert!(EventStatus::Rejected.can_transition_to(EventStatus::Approved, true));
        assert!(!EventStatus::Rejected.can_transition_to(EventStatus::Cancelled, false));
    }

    #[test]
    fn cancelled_reactivation_gated_on_event_date() {
        assert!(EventStatus::Cancelled.can_transition_to(EventStatus::Approved, false));
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Approved, true));
    }

    #[test]
    fn reapplying_current_status_is_accepted() {
        for status in [
            EventStatus::Pending,
            EventStatus::Approved,
            EventStatus::Rejected,
            EventStatus::Cancelled,
        ] {
            assert!(status.can_transition_to(status, true));
        }
    }

    #[test]
    fn crossing_into_approved_increments() {
        assert_eq!(
            counter_adjustment(EventStatus::Pending, EventStatus::Approved),
            Some(CounterAdjustment::Increment)
        );
        assert_eq!(
            counter_adjustment(EventStatus::Rejected, EventStatus::Approved),
            Some(CounterAdjustment::Increment)
        );
    }

    #[test]
    fn leaving_approved_decrements() {
        assert_eq!(
            counter_adjustment(EventStatus::Approved, EventStatus::Rejected),
            Some(CounterAdjustment::Decrement)
        );
        assert_eq!(
            counter_adjustment(EventStatus::Approved, EventStatus::Cancelled),
            Some(CounterAdjustment::Decrement)
        );
    }

    #[test]
    fn same_side_transitions_have_no_effect() {
        assert_eq!(
            counter_adjustment(EventStatus::Pending, EventStatus::Rejected),
            None
        );
        assert_eq!(
            counter_adjustment(EventStatus::Approved, EventStatus::Approved),
            None
        );
        assert_eq!(
            counter_adjustment(EventStatus::Pending, EventStatus::Pending),
            None
        );
    }

    #[test]
    fn approve_then_reject_nets_to_zero() {
        // The §8-style net-zero property: one increment followed by one
        // decrement when an event is approved and then rejected.
        let up = counter_adjustment(EventStatus::Pending, EventStatus::Approved);
        let down = counter_adjustment(EventStatus::Approved, EventStatus::Rejected);
        let net: i64 = [up, down]
            .into_iter()
            .flatten()
            .map(|adj| match adj {
                CounterAdjustment::Increment => 1,
                CounterAdjustment::Decrement => -1,
            })
            .sum();
        assert_eq!(net, 0);
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [
            EventStatus::Pending,
            EventStatus::Approved,
            EventStatus::Rejected,
            EventStatus::Cancelled,
        ] {
            let parsed: Result<EventStatus, _> = status.as_str().parse();
            assert_eq!(parsed, Ok(status));
        }
        let bad: Result<EventStatus, _> = "archived".parse();
        assert!(bad.is_err());
    }
}
