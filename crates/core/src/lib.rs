//! Pitch deck domain logic.
//!
//! Everything in this crate is pure: slide documents, the default catalog,
//! the merge of stored overrides onto that catalog, navigation, edit
//! debouncing, and upload validation. Storage and HTTP live in the `db`
//! and `api` crates.

pub mod catalog;
pub mod edit;
pub mod error;
pub mod merge;
pub mod navigation;
pub mod slide;
pub mod types;
pub mod upload;
