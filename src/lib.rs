//! # eventry
//!
//! Event lifecycle, archival, and duplicate-resolution engine for a
//! community-events directory.
//!
//! The directory's interesting problems are not the listings but the
//! mutations behind them: the event lifecycle state machine, the
//! archival engine that moves expired events into an immutable history,
//! the denormalized counters both of those must keep consistent, and
//! the duplicate-community workflow that mutates the same aggregate
//! state. This crate owns those pieces; rendering, search, and auth are
//! external collaborators.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)                    Timer
//!     │                               │
//!     ├── REST Handlers (api/)        ├── Sweep task (scheduler)
//!     │                               │
//!     ├── LifecycleService ───────────┤
//!     ├── ArchiveService ── AssetCleaner (assets)
//!     ├── DuplicateService            │
//!     │                               │
//!     ├── CounterStore (atomic ±1)    │
//!     ├── AuditLog                    │
//!     │                               │
//!     └── PostgreSQL (events, archived_events, communities,
//!         venues, admin_community_duplicates, cleanup_logs)
//! ```

pub mod api;
pub mod app_state;
pub mod assets;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod scheduler;
pub mod service;
