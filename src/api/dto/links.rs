//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::Link;

/// Compiled regex for slug characters.
static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Destination URL (must be HTTP/HTTPS).
    #[validate(url(message = "Please enter a valid URL"))]
    pub url: String,

    /// Optional custom slug; a random one is generated when absent or blank.
    /// Checked by the link service, which also rejects reserved words.
    pub custom_slug: Option<String>,

    /// Optional cap on the number of redirects.
    #[validate(range(min = 0, message = "Max clicks cannot be negative"))]
    pub max_clicks: Option<i64>,

    /// Optional expiry timestamp. After this time the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/links/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New destination URL.
    #[validate(url(message = "Please enter a valid URL"))]
    pub url: String,

    /// New slug; may be the current one.
    #[validate(length(min = 3, max = 12, message = "Slug must be 3-12 characters long"))]
    #[validate(regex(
        path = "*SLUG_REGEX",
        message = "Slug can only contain letters, numbers, hyphens, and underscores"
    ))]
    pub slug: String,
}

/// JSON representation of a link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub slug: String,
    pub url: String,
    pub click_count: i64,
    pub max_clicks: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            slug: link.slug,
            url: link.url,
            click_count: link.click_count,
            max_clicks: link.max_clicks,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Response body for `GET /api/links`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkResponse>,
}
