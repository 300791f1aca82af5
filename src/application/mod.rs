//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Public slug resolution and click recording
//! - [`services::link_service::LinkService`] - Owner-scoped link management

pub mod services;
