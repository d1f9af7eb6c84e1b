//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::{AuditLog, DirectoryStore};
use crate::service::{ArchiveService, DuplicateService, LifecycleService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Row-level store for read endpoints.
    pub store: DirectoryStore,
    /// Lifecycle service for status transitions and deletions.
    pub lifecycle: Arc<LifecycleService>,
    /// Archival engine for sweep and single-event archival.
    pub archive: Arc<ArchiveService>,
    /// Duplicate-resolution workflow.
    pub duplicates: Arc<DuplicateService>,
    /// Audit log for the cleanup-history endpoint.
    pub audit: AuditLog,
}
