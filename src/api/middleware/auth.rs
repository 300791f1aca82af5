//! Owner identification middleware for the management API.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Authenticated owner id, inserted into request extensions by [`layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

/// Requires the configured owner header and exposes its value as [`Owner`].
///
/// The identity itself is asserted by the fronting auth provider; this layer
/// only rejects requests that arrive without one.
///
/// # Header Format
///
/// ```text
/// X-User-Id: user_2abc
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, blank, or not valid
/// visible ASCII.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let owner = req
        .headers()
        .get(&st.owner_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": format!("{} header is missing or invalid", st.owner_header) }),
            )
        })?;

    req.extensions_mut().insert(Owner(owner));

    Ok(next.run(req).await)
}
