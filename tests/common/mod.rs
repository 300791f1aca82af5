#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderName;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;
use slinky::domain::entities::{Link, LinkUpdate, NewLink};
use slinky::domain::repositories::LinkRepository;
use slinky::error::AppError;
use slinky::infrastructure::persistence::InMemoryLinkRepository;
use slinky::routes::router;
use slinky::state::{AppState, DEFAULT_OWNER_HEADER};
use std::sync::Arc;
use std::time::Duration;

pub const OWNER: &str = "user_alice";
pub const OTHER_OWNER: &str = "user_bob";

pub fn create_test_state(repo: Arc<dyn LinkRepository>) -> AppState {
    AppState::new(
        repo,
        Duration::from_secs(2),
        HeaderName::from_static(DEFAULT_OWNER_HEADER),
    )
}

/// Test server over the full router, backed by `repo`.
pub fn create_test_server(repo: Arc<dyn LinkRepository>) -> TestServer {
    TestServer::new(router(create_test_state(repo))).unwrap()
}

pub fn test_link(id: i64, slug: &str, url: &str) -> Link {
    let now = Utc::now();
    Link {
        id,
        owner_id: OWNER.to_string(),
        slug: slug.to_string(),
        url: url.to_string(),
        click_count: 0,
        max_clicks: None,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn seed_link(repo: &InMemoryLinkRepository, id: i64, slug: &str, url: &str) -> Link {
    repo.insert(test_link(id, slug, url)).unwrap()
}

pub fn seed_capped_link(
    repo: &InMemoryLinkRepository,
    id: i64,
    slug: &str,
    click_count: i64,
    max_clicks: i64,
) -> Link {
    repo.insert(Link {
        click_count,
        max_clicks: Some(max_clicks),
        ..test_link(id, slug, "https://example.com/capped")
    })
    .unwrap()
}

pub fn seed_expiring_link(
    repo: &InMemoryLinkRepository,
    id: i64,
    slug: &str,
    expires_at: DateTime<Utc>,
) -> Link {
    repo.insert(Link {
        expires_at: Some(expires_at),
        ..test_link(id, slug, "https://example.com/expiring")
    })
    .unwrap()
}

/// Link store whose every call fails, as if the database were down.
pub struct UnavailableRepository;

fn down() -> AppError {
    AppError::internal("Database error", json!({}))
}

#[async_trait]
impl LinkRepository for UnavailableRepository {
    async fn create(&self, _new_link: NewLink) -> Result<Link, AppError> {
        Err(down())
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Link>, AppError> {
        Err(down())
    }

    async fn increment_click_count(&self, _id: i64) -> Result<Option<Link>, AppError> {
        Err(down())
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Link>, AppError> {
        Err(down())
    }

    async fn update(
        &self,
        _id: i64,
        _owner_id: &str,
        _update: LinkUpdate,
    ) -> Result<Option<Link>, AppError> {
        Err(down())
    }

    async fn delete(&self, _id: i64, _owner_id: &str) -> Result<bool, AppError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(down())
    }
}
