//! Shared application state injected into handlers.

use axum::http::HeaderName;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{LinkService, RedirectService};
use crate::domain::repositories::LinkRepository;

/// Header carrying the owner id when none is configured.
pub const DEFAULT_OWNER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub link_service: Arc<LinkService>,
    /// Header set by the fronting identity provider with the caller's owner id.
    pub owner_header: HeaderName,
}

impl AppState {
    /// Wires both services over the same link store.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        store_timeout: Duration,
        owner_header: HeaderName,
    ) -> Self {
        Self {
            redirect_service: Arc::new(RedirectService::new(repository.clone(), store_timeout)),
            link_service: Arc::new(LinkService::new(repository)),
            owner_header,
        }
    }
}
