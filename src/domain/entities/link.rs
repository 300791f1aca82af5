//! Link entity representing a short slug and its redirect policy.

use chrono::{DateTime, Utc};

/// A shortened URL owned by a single user.
///
/// `click_count` only ever grows, and only through the redirect path.
/// `max_clicks` and `expires_at` are optional limits; a link that hit either
/// of them is exhausted and must not redirect anymore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub owner_id: String,
    pub slug: String,
    pub url: String,
    pub click_count: i64,
    pub max_clicks: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if `now` is strictly after the link's expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// Returns true if the click counter has reached the configured cap.
    pub fn is_quota_reached(&self) -> bool {
        self.max_clicks
            .is_some_and(|max_clicks| self.click_count >= max_clicks)
    }

    /// Returns true if the link can no longer be redirected.
    pub fn is_exhausted_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expired_at(now) || self.is_quota_reached()
    }
}

/// Input data for creating a new link.
///
/// The store assigns `id`, timestamps and a zero `click_count`.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub owner_id: String,
    pub slug: String,
    pub url: String,
    pub max_clicks: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Replacement destination and slug for an existing link.
///
/// The link keeps its `id`, counter and limits.
#[derive(Debug, Clone)]
pub struct LinkUpdate {
    pub url: String,
    pub slug: String,
}
