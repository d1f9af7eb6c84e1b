//! Non-fatal secondary failures carried on successful outcomes.
//!
//! Counter maintenance and asset cleanup are deliberately allowed to fail
//! without failing the enclosing operation. Instead of discarding those
//! failures, each one becomes a [`Warning`] on the outcome so callers and
//! the audit log can still observe the drift.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::event_status::CounterAdjustment;

/// The aggregate a denormalized `event_count` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    /// A community's `event_count`.
    Community,
    /// A venue's `event_count`.
    Venue,
}

impl Aggregate {
    /// Short tag used in warnings and audit entries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Venue => "venue",
        }
    }
}

/// A swallowed secondary failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An atomic counter update failed; the denormalized count has
    /// drifted from the true approved-event total.
    CounterUpdate {
        /// Which aggregate the counter belongs to.
        aggregate: Aggregate,
        /// Id of the community or venue.
        id: Uuid,
        /// Whether the failed update was an increment or a decrement.
        adjustment: CounterAdjustment,
        /// Underlying failure, stringified.
        reason: String,
    },
    /// Deleting a stored asset failed; the object is orphaned in storage.
    AssetCleanup {
        /// URL of the asset that could not be removed.
        url: String,
        /// Underlying failure, stringified.
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CounterUpdate {
                aggregate,
                id,
                adjustment,
                reason,
            } => write!(
                f,
                "{} of {} counter {id} failed: {reason}",
                adjustment.as_str(),
                aggregate.as_str()
            ),
            Self::AssetCleanup { url, reason } => {
                write!(f, "cleanup of asset {url} failed: {reason}")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn counter_warning_display_names_the_aggregate() {
        let id = Uuid::new_v4();
        let warning = Warning::CounterUpdate {
            aggregate: Aggregate::Venue,
            id,
            adjustment: CounterAdjustment::Decrement,
            reason: "connection reset".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("venue"));
        assert!(text.contains("decrement"));
        assert!(text.contains(&id.to_string()));
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = Warning::AssetCleanup {
            url: "https://assets.example/banners/a.png".to_string(),
            reason: "404".to_string(),
        };
        let json = serde_json::to_value(&warning).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(
            json.get("kind").and_then(|v| v.as_str()),
            Some("asset_cleanup")
        );
    }
}
