//! Persistence layer: PostgreSQL store, atomic counters, and audit log.
//!
//! [`DirectoryStore`] holds all row-level queries, [`CounterStore`] is
//! the only path allowed to mutate denormalized event counts, and
//! [`AuditLog`] is the append-only sink for archival runs and swallowed
//! secondary failures. All three are thin `Clone` handles over one
//! `sqlx::PgPool`.

pub mod audit;
pub mod counters;
pub mod models;
pub mod postgres;

pub use audit::AuditLog;
pub use counters::CounterStore;
pub use postgres::{ArchiveFilter, DirectoryStore, EventFilter};
