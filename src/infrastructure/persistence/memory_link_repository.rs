//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, LinkUpdate, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link store backed by `DashMap`.
///
/// Links are keyed by id, with a second map enforcing global slug
/// uniqueness. Click increments happen under the entry's shard write lock,
/// which makes them atomic with respect to each other. When both maps are
/// locked at once, `links` is always taken before `slugs`.
#[derive(Debug)]
pub struct InMemoryLinkRepository {
    links: DashMap<i64, Link>,
    slugs: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            slugs: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a fully-formed link, keeping its id and counters.
    ///
    /// Useful for seeding state such as a link that already reached its quota.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug or id is already taken.
    pub fn insert(&self, link: Link) -> Result<Link, AppError> {
        if self.links.contains_key(&link.id) {
            return Err(AppError::conflict(
                "Link id already exists",
                json!({ "id": link.id }),
            ));
        }

        match self.slugs.entry(link.slug.clone()) {
            Entry::Occupied(_) => return Err(slug_conflict(&link.slug)),
            Entry::Vacant(vacant) => {
                vacant.insert(link.id);
            }
        }

        self.next_id.fetch_max(link.id + 1, Ordering::SeqCst);
        self.links.insert(link.id, link.clone());

        Ok(link)
    }

    /// Returns the link with this id, if any.
    pub fn get(&self, id: i64) -> Option<Link> {
        self.links.get(&id).map(|link| link.value().clone())
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no links are stored.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::conflict("Unique constraint violation", json!({ "slug": slug }))
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        match self.slugs.entry(new_link.slug.clone()) {
            Entry::Occupied(_) => return Err(slug_conflict(&new_link.slug)),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let now = Utc::now();
        let link = Link {
            id,
            owner_id: new_link.owner_id,
            slug: new_link.slug,
            url: new_link.url,
            click_count: 0,
            max_clicks: new_link.max_clicks,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        };

        self.links.insert(id, link.clone());

        Ok(link)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let Some(id) = self.slugs.get(slug).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.get(id))
    }

    async fn increment_click_count(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.links.get_mut(&id).map(|mut link| {
            link.click_count += 1;
            link.clone()
        }))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .links
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(links)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        update: LinkUpdate,
    ) -> Result<Option<Link>, AppError> {
        // Held until the slug index is updated so a concurrent delete cannot
        // strand the newly claimed slug.
        let Some(mut link) = self.links.get_mut(&id) else {
            return Ok(None);
        };
        if link.owner_id != owner_id {
            return Ok(None);
        }

        if link.slug != update.slug {
            match self.slugs.entry(update.slug.clone()) {
                Entry::Occupied(_) => return Err(slug_conflict(&update.slug)),
                Entry::Vacant(vacant) => {
                    vacant.insert(id);
                }
            }
            self.slugs.remove(&link.slug);
        }

        link.url = update.url;
        link.slug = update.slug;
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<bool, AppError> {
        let Some((_, link)) = self
            .links
            .remove_if(&id, |_, link| link.owner_id == owner_id)
        else {
            return Ok(false);
        };

        self.slugs.remove(&link.slug);

        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(owner: &str, slug: &str) -> NewLink {
        NewLink {
            owner_id: owner.to_string(),
            slug: slug.to_string(),
            url: "https://example.com".to_string(),
            max_clicks: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_slug() {
        let repo = InMemoryLinkRepository::new();
        let created = repo.create(new_link("user_1", "abc123")).await.unwrap();

        assert_eq!(created.click_count, 0);

        let found = repo.find_by_slug("abc123").await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_find_by_slug_is_case_sensitive() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("user_1", "abc123")).await.unwrap();

        assert!(repo.find_by_slug("ABC123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slug_unique_across_owners() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("user_1", "taken")).await.unwrap();

        let result = repo.create(new_link("user_2", "taken")).await;
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_increment_click_count() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link("user_1", "abc123")).await.unwrap();

        let updated = repo.increment_click_count(link.id).await.unwrap().unwrap();
        assert_eq!(updated.click_count, 1);

        assert!(repo.increment_click_count(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_changes_slug_and_keeps_id() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link("user_1", "old")).await.unwrap();

        let updated = repo
            .update(
                link.id,
                "user_1",
                LinkUpdate {
                    url: "https://new.example.com".to_string(),
                    slug: "new".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, link.id);
        assert_eq!(updated.slug, "new");
        assert!(repo.find_by_slug("old").await.unwrap().is_none());
        assert!(repo.find_by_slug("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_other_owner_is_none() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link("user_1", "mine")).await.unwrap();

        let result = repo
            .update(
                link.id,
                "user_2",
                LinkUpdate {
                    url: "https://evil.example.com".to_string(),
                    slug: "mine".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_frees_slug() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link("user_1", "gone")).await.unwrap();

        assert!(!repo.delete(link.id, "user_2").await.unwrap());
        assert!(repo.delete(link.id, "user_1").await.unwrap());
        assert!(repo.find_by_slug("gone").await.unwrap().is_none());
        assert!(repo.create(new_link("user_2", "gone")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_slug_conflict_keeps_both_slugs() {
        let repo = InMemoryLinkRepository::new();
        let first = repo.create(new_link("user_1", "one")).await.unwrap();
        repo.create(new_link("user_1", "two")).await.unwrap();

        let result = repo
            .update(
                first.id,
                "user_1",
                LinkUpdate {
                    url: "https://example.com".to_string(),
                    slug: "two".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
        assert_eq!(repo.find_by_slug("one").await.unwrap().unwrap().id, first.id);
        assert_ne!(repo.find_by_slug("two").await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_update_racing_delete_leaves_no_stale_slug() {
        let repo = std::sync::Arc::new(InMemoryLinkRepository::new());

        for i in 0..200 {
            let old_slug = format!("old{i}");
            let new_slug = format!("new{i}");
            let id = repo.create(new_link("user_1", &old_slug)).await.unwrap().id;

            let updater = {
                let repo = repo.clone();
                let slug = new_slug.clone();
                tokio::spawn(async move {
                    repo.update(
                        id,
                        "user_1",
                        LinkUpdate {
                            url: "https://example.com".to_string(),
                            slug,
                        },
                    )
                    .await
                })
            };
            let deleter = {
                let repo = repo.clone();
                tokio::spawn(async move { repo.delete(id, "user_1").await })
            };

            updater.await.unwrap().unwrap();
            assert!(deleter.await.unwrap().unwrap());

            assert!(repo.find_by_slug(&old_slug).await.unwrap().is_none());
            assert!(repo.find_by_slug(&new_slug).await.unwrap().is_none());
            assert!(repo.create(new_link("user_2", &new_slug)).await.is_ok());
        }
    }
}
