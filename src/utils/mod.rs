//! Utility functions for slug handling and URL validation.
//!
//! - [`slug`] - Slug format checks, creation policy and random generation
//! - [`url_validator`] - Destination URL validation

pub mod slug;
pub mod url_validator;
