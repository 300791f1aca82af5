//! Handler for short URL redirect.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::Redirect,
};

use crate::error::RedirectError;
use crate::state::AppState;

/// Redirects a slug to its destination URL and records the click.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Responses
///
/// | Outcome | Status | Body |
/// |---|---|---|
/// | success | 307 | empty, `Location: <url>` |
/// | malformed slug | 400 | `Invalid shortcode format` |
/// | unknown slug | 404 | `Link not found` |
/// | expired | 410 | `Link has expired` |
/// | click cap reached | 410 | `Link has reached maximum clicks` |
/// | store failure | 500 | `Internal server error` |
///
/// A click is counted only on the success path. A path segment that does
/// not decode to UTF-8 is reported as a malformed slug.
pub async fn redirect_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Redirect, RedirectError> {
    let Ok(Path(slug)) = path else {
        tracing::trace!("Rejected undecodable slug");
        return Err(RedirectError::InvalidFormat);
    };

    let target = state.redirect_service.resolve(&slug).await?;

    Ok(Redirect::temporary(&target.url))
}
