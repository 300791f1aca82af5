//! Owner-scoped link management service.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkUpdate, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::{generate_slug, validate_custom_slug};
use crate::utils::url_validator::validate_url;

/// Attempts at finding a free random slug before giving up.
const MAX_SLUG_ATTEMPTS: usize = 10;

/// Input for [`LinkService::create_link`].
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub url: String,
    pub custom_slug: Option<String>,
    pub max_clicks: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating, editing, deleting and listing an owner's links.
///
/// Every mutating call is scoped to `owner_id`: a link that exists but
/// belongs to someone else is reported exactly like a missing one.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Creates a link for `owner_id`.
    ///
    /// # Slug Selection
    ///
    /// - If `custom_slug` is provided (and not blank), validates and uses it
    /// - Otherwise, generates a random 8-character slug
    /// - Retries up to 10 times on collision before failing
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL, slug, click cap or expiry is invalid.
    /// Returns [`AppError::Conflict`] if the custom slug is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_link(&self, owner_id: &str, input: CreateLink) -> Result<Link, AppError> {
        let url = validate_url(&input.url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "url", "value": input.url }))
        })?;

        if let Some(max_clicks) = input.max_clicks
            && max_clicks < 0
        {
            return Err(AppError::bad_request(
                "Max clicks cannot be negative",
                json!({ "max_clicks": max_clicks }),
            ));
        }

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        let custom_slug = input.custom_slug.filter(|slug| !slug.is_empty());

        if let Some(slug) = custom_slug {
            validate_custom_slug(&slug)?;

            let new_link = NewLink {
                owner_id: owner_id.to_string(),
                slug: slug.clone(),
                url,
                max_clicks: input.max_clicks,
                expires_at: input.expires_at,
            };

            return self.repository.create(new_link).await.map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(
                    "This custom slug is already taken. Please choose another one.",
                    json!({ "slug": slug }),
                ),
                other => other,
            });
        }

        for _ in 0..MAX_SLUG_ATTEMPTS {
            let new_link = NewLink {
                owner_id: owner_id.to_string(),
                slug: generate_slug()?,
                url: url.clone(),
                max_clicks: input.max_clicks,
                expires_at: input.expires_at,
            };

            match self.repository.create(new_link).await {
                Err(AppError::Conflict { .. }) => continue,
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Changes the destination and slug of one of `owner_id`'s links.
    ///
    /// The click counter, cap and expiry are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or slug is invalid.
    /// Returns [`AppError::NotFound`] if the link does not exist or is not owned by the caller.
    /// Returns [`AppError::Conflict`] if the slug is taken by another link.
    pub async fn update_link(
        &self,
        owner_id: &str,
        id: i64,
        url: &str,
        slug: &str,
    ) -> Result<Link, AppError> {
        let url = validate_url(url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "url", "value": url }))
        })?;
        validate_custom_slug(slug)?;

        let update = LinkUpdate {
            url,
            slug: slug.to_string(),
        };

        self.repository
            .update(id, owner_id, update)
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(
                    "This slug is already taken. Please choose another one.",
                    json!({ "slug": slug }),
                ),
                other => other,
            })?
            .ok_or_else(|| {
                AppError::not_found(
                    "Link not found or you don't have permission to update it",
                    json!({ "id": id }),
                )
            })
    }

    /// Deletes one of `owner_id`'s links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not owned by the caller.
    pub async fn delete_link(&self, owner_id: &str, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id, owner_id).await? {
            return Err(AppError::not_found(
                "Link not found or you don't have permission to delete it",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    /// Lists `owner_id`'s links, newest first.
    pub async fn list_links(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Checks that the link store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::slug::is_valid_slug;
    use chrono::Duration;

    fn create_test_link(id: i64, slug: &str, url: &str) -> Link {
        let now = Utc::now();
        Link {
            id,
            owner_id: "user_1".to_string(),
            slug: slug.to_string(),
            url: url.to_string(),
            click_count: 0,
            max_clicks: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn echo_created(new_link: NewLink) -> Result<Link, AppError> {
        let mut link = create_test_link(10, &new_link.slug, &new_link.url);
        link.owner_id = new_link.owner_id;
        link.max_clicks = new_link.max_clicks;
        link.expires_at = new_link.expires_at;
        Ok(link)
    }

    #[tokio::test]
    async fn test_create_link_generates_slug() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(|new_link| new_link.slug.len() == 8 && is_valid_slug(&new_link.slug))
            .times(1)
            .returning(echo_created);

        let service = LinkService::new(Arc::new(mock));

        let link = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.url, "https://example.com/");
        assert_eq!(link.owner_id, "user_1");
        assert_eq!(link.click_count, 0);
    }

    #[tokio::test]
    async fn test_create_link_blank_custom_slug_is_generated() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(|new_link| new_link.slug.len() == 8)
            .times(1)
            .returning(echo_created);

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    custom_slug: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_retries_generated_slug_collisions() {
        let mut mock = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_create()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(echo_created);

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_gives_up_after_max_attempts() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .times(MAX_SLUG_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_create_link_with_custom_slug_and_limits() {
        let expires_at = Utc::now() + Duration::days(1);

        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(move |new_link| {
                new_link.slug == "my_link"
                    && new_link.max_clicks == Some(5)
                    && new_link.expires_at == Some(expires_at)
            })
            .times(1)
            .returning(echo_created);

        let service = LinkService::new(Arc::new(mock));

        let link = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    custom_slug: Some("my_link".to_string()),
                    max_clicks: Some(5),
                    expires_at: Some(expires_at),
                },
            )
            .await
            .unwrap();

        assert_eq!(link.slug, "my_link");
        assert_eq!(link.max_clicks, Some(5));
    }

    #[tokio::test]
    async fn test_create_link_custom_slug_conflict() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = LinkService::new(Arc::new(mock));

        let err = service
            .create_link(
                "user_1",
                CreateLink {
                    url: "https://example.com".to_string(),
                    custom_slug: Some("taken".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn test_create_link_rejects_invalid_input_without_store_calls() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create().never();

        let service = LinkService::new(Arc::new(mock));

        let cases = [
            CreateLink {
                url: "javascript:alert(1)".to_string(),
                ..Default::default()
            },
            CreateLink {
                url: "not-a-url".to_string(),
                ..Default::default()
            },
            CreateLink {
                url: "https://example.com".to_string(),
                custom_slug: Some("admin".to_string()),
                ..Default::default()
            },
            CreateLink {
                url: "https://example.com".to_string(),
                custom_slug: Some("../etc".to_string()),
                ..Default::default()
            },
            CreateLink {
                url: "https://example.com".to_string(),
                max_clicks: Some(-1),
                ..Default::default()
            },
            CreateLink {
                url: "https://example.com".to_string(),
                expires_at: Some(Utc::now() - Duration::minutes(1)),
                ..Default::default()
            },
        ];

        for input in cases {
            let result = service.create_link("user_1", input.clone()).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[tokio::test]
    async fn test_update_link_success() {
        let mut mock = MockLinkRepository::new();
        mock.expect_update()
            .withf(|id, owner, update| {
                *id == 3 && owner == "user_1" && update.slug == "renamed"
            })
            .times(1)
            .returning(|id, _, update| {
                Ok(Some(create_test_link(id, &update.slug, &update.url)))
            });

        let service = LinkService::new(Arc::new(mock));

        let link = service
            .update_link("user_1", 3, "https://new.example.com", "renamed")
            .await
            .unwrap();

        assert_eq!(link.id, 3);
        assert_eq!(link.slug, "renamed");
        assert_eq!(link.url, "https://new.example.com/");
    }

    #[tokio::test]
    async fn test_update_link_not_owned() {
        let mut mock = MockLinkRepository::new();
        mock.expect_update().times(1).returning(|_, _, _| Ok(None));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .update_link("user_2", 3, "https://example.com", "renamed")
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_link_slug_conflict() {
        let mut mock = MockLinkRepository::new();
        mock.expect_update()
            .times(1)
            .returning(|_, _, _| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = LinkService::new(Arc::new(mock));

        let err = service
            .update_link("user_1", 3, "https://example.com", "taken")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn test_update_link_validates_slug() {
        let mut mock = MockLinkRepository::new();
        mock.expect_update().never();

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .update_link("user_1", 3, "https://example.com", "no")
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut mock = MockLinkRepository::new();
        mock.expect_delete()
            .withf(|id, owner| *id == 1 && owner == "user_1")
            .returning(|_, _| Ok(true));
        mock.expect_delete()
            .withf(|_, owner| owner == "user_2")
            .returning(|_, _| Ok(false));

        let service = LinkService::new(Arc::new(mock));

        assert!(service.delete_link("user_1", 1).await.is_ok());
        assert!(matches!(
            service.delete_link("user_2", 1).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
