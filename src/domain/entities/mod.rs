//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures with small, side-effect-free policy
//! helpers. Persistence concerns live in `crate::infrastructure`.
//!
//! # Entity Types
//!
//! - [`Link`] - A short slug mapped to a destination URL, with click counting
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for writes:
//! - [`NewLink`] - For creating new records
//! - [`LinkUpdate`] - For changing the destination or slug of an existing link

pub mod link;

pub use link::{Link, LinkUpdate, NewLink};
