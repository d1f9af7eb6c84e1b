//! Service layer: business logic orchestration.
//!
//! [`LifecycleService`] drives event status transitions and deletions,
//! [`ArchiveService`] moves expired events into the immutable archive,
//! and [`DuplicateService`] processes admin decisions on duplicate
//! candidates. All three share the persistence handles and route every
//! counter mutation through the atomic [`CounterStore`](crate::persistence::CounterStore).

pub mod archive;
pub mod duplicates;
pub mod lifecycle;

pub use archive::{ArchiveService, SweepReport};
pub use duplicates::{DuplicateService, MergeOutcome, ResolutionOutcome};
pub use lifecycle::{DeleteOutcome, LifecycleService, TransitionOutcome};
