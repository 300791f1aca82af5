//! Handlers for link management endpoints (list, create, update, delete).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, LinkListResponse, LinkResponse, UpdateLinkRequest,
};
use crate::api::middleware::auth::Owner;
use crate::application::services::CreateLink;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list_links(&owner).await?;

    let items: Vec<LinkResponse> = links.into_iter().map(LinkResponse::from).collect();

    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/article",
///   "custom_slug": "my-link",                // optional
///   "max_clicks": 100,                        // optional
///   "expires_at": "2026-12-31T23:59:59Z"      // optional
/// }
/// ```
///
/// # Errors
///
/// Returns 400 if validation fails and 409 if the custom slug is taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(
            &owner,
            CreateLink {
                url: payload.url,
                custom_slug: payload.custom_slug,
                max_clicks: payload.max_clicks,
                expires_at: payload.expires_at,
            },
        )
        .await?;

    tracing::info!(link_id = link.id, slug = %link.slug, "Link created");

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Replaces the URL and slug of one of the caller's links.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
///
/// Click count, cap and expiry are preserved.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(&owner, id, &payload.url, &payload.slug)
        .await?;

    Ok(Json(link.into()))
}

/// Deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// Returns `204 No Content` on success, 404 if the link is missing or owned
/// by someone else.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&owner, id).await?;

    tracing::info!(link_id = id, "Link deleted");

    Ok(StatusCode::NO_CONTENT)
}
