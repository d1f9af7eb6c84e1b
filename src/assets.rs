//! Asset Cleanup Collaborator boundary.
//!
//! The archival engine deletes sponsor banners and similar stored
//! objects through this seam. Cleanup failures are always non-fatal to
//! callers: they surface as warnings, never as errors.

use async_trait::async_trait;

/// Error from the asset-cleanup collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// The HTTP request could not be sent or completed.
    #[error("cleanup request failed: {0}")]
    Request(String),

    /// The storage service answered with a non-success status.
    #[error("storage returned {status} for {url}")]
    Status {
        /// HTTP status code returned by the storage service.
        status: u16,
        /// URL of the asset that could not be removed.
        url: String,
    },
}

/// Deletes stored assets given their URL.
///
/// Injected into the archival engine as `Arc<dyn AssetCleaner>` so tests
/// can substitute a recording double.
#[async_trait]
pub trait AssetCleaner: Send + Sync + std::fmt::Debug {
    /// Deletes the asset behind `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`CleanupError`] when the storage service refuses or
    /// cannot be reached. Callers treat this as non-fatal.
    async fn delete_asset(&self, url: &str) -> Result<(), CleanupError>;
}

/// HTTP-backed cleaner issuing authenticated `DELETE` requests against
/// the asset storage service.
#[derive(Debug, Clone)]
pub struct HttpAssetCleaner {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpAssetCleaner {
    /// Creates a cleaner for the storage service at `base_url`.
    #[must_use]
    pub fn new(base_url: String, bearer_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            bearer_token,
        }
    }
}

/// Resolves a stored-asset reference against the storage base URL.
/// Absolute URLs pass through; bare object keys are joined onto the base.
fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl AssetCleaner for HttpAssetCleaner {
    async fn delete_asset(&self, url: &str) -> Result<(), CleanupError> {
        let target = resolve_url(&self.base_url, url);

        let mut request = self.client.delete(&target);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CleanupError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CleanupError::Status {
                status: response.status().as_u16(),
                url: target,
            });
        }

        tracing::debug!(url = %target, "asset deleted");
        Ok(())
    }
}

/// Cleaner used when no storage service is configured: accepts every
/// request without touching anything.
#[derive(Debug, Clone, Default)]
pub struct NoopAssetCleaner;

#[async_trait]
impl AssetCleaner for NoopAssetCleaner {
    async fn delete_asset(&self, url: &str) -> Result<(), CleanupError> {
        tracing::debug!(url, "asset cleanup disabled; skipping");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        let resolved = resolve_url(
            "https://storage.example",
            "https://cdn.example/banners/a.png",
        );
        assert_eq!(resolved, "https://cdn.example/banners/a.png");
    }

    #[test]
    fn bare_keys_join_onto_the_base() {
        let resolved = resolve_url("https://storage.example/", "/banners/a.png");
        assert_eq!(resolved, "https://storage.example/banners/a.png");
    }

    #[tokio::test]
    async fn noop_cleaner_accepts_everything() {
        let cleaner = NoopAssetCleaner;
        assert!(cleaner.delete_asset("banners/a.png").await.is_ok());
    }
}
