//! Public short link resolution.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, RedirectError};
use crate::utils::slug::is_valid_slug;

/// A successful resolution: where to send the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub link_id: i64,
    pub url: String,
    /// Click count after this visit was recorded.
    pub click_count: i64,
}

/// Resolves slugs from the public redirect endpoint.
///
/// Every call walks the same gates in order and stops at the first failure:
///
/// 1. Format validation (no store access on failure)
/// 2. Lookup by exact slug
/// 3. Expiry check
/// 4. Quota check against the count read in step 2
/// 5. Atomic click increment
///
/// Concurrent visits of a link sitting at its quota boundary may all pass
/// step 4 before any of them increments, so the cap can be overshot by the
/// number of in-flight requests. Increments themselves are never lost.
///
/// Each store call is bounded by `store_timeout`. Nothing is retried and
/// nothing is cached between calls.
pub struct RedirectService {
    repository: Arc<dyn LinkRepository>,
    store_timeout: Duration,
}

impl RedirectService {
    /// Creates a new redirect service.
    pub fn new(repository: Arc<dyn LinkRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Resolves `raw_slug` against the current time and records a click.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_at`].
    pub async fn resolve(&self, raw_slug: &str) -> Result<RedirectTarget, RedirectError> {
        self.resolve_at(raw_slug, Utc::now()).await
    }

    /// Resolves `raw_slug` as of `now` and records a click.
    ///
    /// # Errors
    ///
    /// - [`RedirectError::InvalidFormat`] if the slug cannot exist
    /// - [`RedirectError::NotFound`] if no link has this slug, or it vanished
    ///   before the click was recorded
    /// - [`RedirectError::Expired`] if `now` is past the link's expiry
    /// - [`RedirectError::QuotaExceeded`] if the link reached `max_clicks`
    /// - [`RedirectError::StoreUnavailable`] if the store failed or timed out
    pub async fn resolve_at(
        &self,
        raw_slug: &str,
        now: DateTime<Utc>,
    ) -> Result<RedirectTarget, RedirectError> {
        if !is_valid_slug(raw_slug) {
            trace!("Rejected malformed slug");
            return Err(RedirectError::InvalidFormat);
        }
        let slug = raw_slug;

        let link = self
            .bounded("find_by_slug", self.repository.find_by_slug(slug))
            .await?
            .ok_or_else(|| {
                debug!(slug, "Link not found");
                RedirectError::NotFound
            })?;

        if link.is_expired_at(now) {
            debug!(slug, expires_at = ?link.expires_at, "Link has expired");
            return Err(RedirectError::Expired);
        }

        if link.is_quota_reached() {
            debug!(
                slug,
                click_count = link.click_count,
                max_clicks = ?link.max_clicks,
                "Link has reached its click quota"
            );
            return Err(RedirectError::QuotaExceeded);
        }

        let updated = self
            .bounded(
                "increment_click_count",
                self.repository.increment_click_count(link.id),
            )
            .await?
            .ok_or_else(|| {
                info!(slug, link_id = link.id, "Link removed before click was recorded");
                RedirectError::NotFound
            })?;

        debug!(slug, click_count = updated.click_count, "Redirecting");

        Ok(RedirectTarget {
            link_id: link.id,
            url: link.url,
            click_count: updated.click_count,
        })
    }

    /// Runs a store call under the configured timeout.
    ///
    /// Store errors and timeouts both become [`RedirectError::StoreUnavailable`].
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, RedirectError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "Link store call failed");
                Err(RedirectError::StoreUnavailable)
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Link store call timed out"
                );
                Err(RedirectError::StoreUnavailable)
            }
        }
    }
}
