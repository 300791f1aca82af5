//! Slug format checks, creation policy and random generation.
//!
//! Two levels of validation exist:
//!
//! - [`is_valid_slug`] is the format gate of the public redirect path. It only
//!   checks length and alphabet, so anything it rejects can never exist in the
//!   store.
//! - [`validate_custom_slug`] is the stricter policy applied when a user picks
//!   a slug: it adds a minimum length and the reserved-word list.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Maximum slug length, matching the `VARCHAR(12)` column.
pub const SLUG_MAX_LENGTH: usize = 12;

/// Minimum length of a user-chosen slug.
pub const CUSTOM_SLUG_MIN_LENGTH: usize = 3;

/// Random bytes per generated slug; 6 bytes encode to 8 URL-safe characters.
const GENERATED_SLUG_BYTES: usize = 6;

/// Slugs that would shadow application routes or well-known paths.
///
/// Compared case-insensitively.
pub const RESERVED_SLUGS: &[&str] = &[
    "api", "dashboard", "admin", "auth", "signin", "signout", "signup", "login", "logout",
    "register", "app", "public", "static", "assets", "images", "scripts", "styles", "css", "js",
    "fonts", "_next", "favicon", "robots", "sitemap", "health", "status",
];

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Returns true if `slug` has the shape of a stored slug.
///
/// # Rules
///
/// - Not empty or whitespace-only
/// - At most [`SLUG_MAX_LENGTH`] characters
/// - Only `[A-Za-z0-9_-]`
///
/// # Examples
///
/// ```
/// use slinky::utils::slug::is_valid_slug;
///
/// assert!(is_valid_slug("abc123"));
/// assert!(is_valid_slug("my_link-2"));
/// assert!(!is_valid_slug("../etc"));
/// assert!(!is_valid_slug("thirteen-char"));
/// ```
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.trim().is_empty() {
        return false;
    }

    if slug.chars().count() > SLUG_MAX_LENGTH {
        return false;
    }

    slug.chars().all(is_slug_char)
}

/// Validates a user-provided slug for creation or update.
///
/// # Rules
///
/// - Length: 3-12 characters
/// - Allowed characters: letters, digits, hyphens, underscores
/// - Cannot be a reserved word (case-insensitive)
/// - Cannot contain path traversal sequences
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    let length = slug.chars().count();

    if length < CUSTOM_SLUG_MIN_LENGTH {
        return Err(AppError::bad_request(
            "Slug must be at least 3 characters long",
            json!({ "provided_length": length }),
        ));
    }

    if length > SLUG_MAX_LENGTH {
        return Err(AppError::bad_request(
            "Slug must be at most 12 characters long",
            json!({ "provided_length": length }),
        ));
    }

    if !slug.chars().all(is_slug_char) {
        return Err(AppError::bad_request(
            "Slug can only contain letters, numbers, hyphens, and underscores",
            json!({ "slug": slug }),
        ));
    }

    let lowered = slug.to_ascii_lowercase();
    if RESERVED_SLUGS.contains(&lowered.as_str()) {
        return Err(AppError::bad_request(
            "This slug is reserved and cannot be used",
            json!({ "slug": slug }),
        ));
    }

    if slug.contains("..") || slug.contains('/') || slug.contains('\\') {
        return Err(AppError::bad_request(
            "Slug contains invalid characters",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}

/// Generates a random 8-character slug from `[A-Za-z0-9_-]`.
///
/// Uses `getrandom` for entropy and URL-safe base64 without padding.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_slug() -> Result<String, AppError> {
    let mut buffer = [0u8; GENERATED_SLUG_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate slug",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}
