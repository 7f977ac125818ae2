#![deny(missing_docs)]

//! # dispatch-core — Foundational Types for the Dispatch Backend
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`PackageId`] and an
//!    [`AccountId`] are distinct types; you cannot pass one where the other
//!    is expected, even though both wrap a UUID.
//!
//! 2. **[`ValidationError`] hierarchy.** Business-rule validation failures
//!    are structured `thiserror` variants carrying the offending value and
//!    the expected constraint — no stringly-typed errors, no
//!    `Box<dyn Error>`.
//!
//! 3. **Pagination as a primitive.** Every collection read in the system
//!    returns a [`Page`], built from the same [`PageParams`] normalization
//!    rules, so page/size/total semantics cannot drift between endpoints.

pub mod error;
pub mod identity;
pub mod page;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::{AccountId, PackageId};
pub use page::{Page, PageParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
