//! Audit log sink for archival runs and swallowed counter failures.

use sqlx::PgPool;

use super::models::AuditLogRecord;
use crate::error::DirectoryError;

/// Action tag for archival sweep entries.
pub const ACTION_EVENT_CLEANUP: &str = "event_cleanup";
/// Action tag for swallowed counter-update failures.
pub const ACTION_COUNTER_UPDATE: &str = "counter_update";
/// Action tag for swallowed asset-cleanup failures.
pub const ACTION_ASSET_CLEANUP: &str = "asset_cleanup";

/// Append-only audit log backed by the `cleanup_logs` table.
///
/// Every archival run and every swallowed secondary failure lands here
/// with a timestamp, an action tag, and either a result payload or an
/// error string.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: PgPool,
}

impl AuditLog {
    /// Creates a new audit log with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a successful action with its structured result.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn record_result(
        &self,
        action: &str,
        result: &serde_json::Value,
    ) -> Result<(), DirectoryError> {
        sqlx::query("INSERT INTO cleanup_logs (action, result) VALUES ($1, $2)")
            .bind(action)
            .bind(result)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Records a failed action with its error string.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn record_error(&self, action: &str, error: &str) -> Result<(), DirectoryError> {
        sqlx::query("INSERT INTO cleanup_logs (action, error) VALUES ($1, $2)")
            .bind(action)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns the most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::Storage`] on database failure.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, DirectoryError> {
        let rows = sqlx::query_as::<_, AuditLogRecord>(
            "SELECT * FROM cleanup_logs ORDER BY executed_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
