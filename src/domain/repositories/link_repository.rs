//! Repository trait for link data access.

use crate::domain::entities::{Link, LinkUpdate, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Slugs are unique across all owners, and lookups by slug are exact and
/// case-sensitive. Implementations must apply [`Self::increment_click_count`]
/// atomically, so concurrent increments are never lost.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link with a zero click counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its exact slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Atomically adds one to the click counter of the link with this `id`.
    ///
    /// Returns the updated link, or `Ok(None)` if the link no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn increment_click_count(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Lists all links belonging to `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError>;

    /// Replaces the destination and slug of a link owned by `owner_id`.
    ///
    /// Returns `Ok(None)` if no link with this `id` belongs to the owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the new slug is taken by another link.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        update: LinkUpdate,
    ) -> Result<Option<Link>, AppError>;

    /// Deletes a link owned by `owner_id`.
    ///
    /// Returns `Ok(true)` if a link was deleted, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, id: i64, owner_id: &str) -> Result<bool, AppError>;

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store does not answer.
    async fn ping(&self) -> Result<(), AppError>;
}
