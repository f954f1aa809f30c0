//! Persisted program catalog
//!
//! The catalog is the single owner of [`record::ProgramRecord`] instances
//! between runs. The scanner and the update-check pipeline only ever talk to
//! it through the [`store::CatalogStore`] contract; [`sqlite::SqliteCatalog`]
//! is the shipped implementation.
//!
//! # Modules
//!
//! - [`record`]: Program records and their configuration enums
//! - [`state`]: Cached cross-run state (fingerprint, user agent, timestamps)
//! - [`store`]: Storage contract consumed by the scan and check subsystems
//! - [`sqlite`]: SQLite-backed store
//! - [`error`]: Error types for catalog operations

pub mod error;
pub mod record;
pub mod sqlite;
pub mod state;
pub mod store;
