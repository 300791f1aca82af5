//! API route configuration.
//!
//! All API endpoints require the owner header via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, delete_link_handler, list_links_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Link management routes, scoped to the calling owner.
///
/// # Endpoints
///
/// - `GET    /links`        - List the caller's links, newest first
/// - `POST   /links`        - Create a link
/// - `PUT    /links/{id}`   - Replace a link's URL and slug
/// - `DELETE /links/{id}`   - Delete a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            axum::routing::put(update_link_handler).delete(delete_link_handler),
        )
}
