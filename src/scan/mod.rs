//! Installed-program snapshot scanning and catalog reconciliation
//!
//! A scan enumerates the OS installed-program sources into a [`snapshot`]
//! with a content fingerprint; [`reconcile`] then diffs that snapshot against
//! the persisted catalog, skipping the whole write pass when the fingerprint
//! is unchanged since the last applied scan.
//!
//! # Modules
//!
//! - [`sources`]: The installed-program enumeration seam ([`sources::ProgramSource`])
//! - [`snapshot`]: Snapshot scanner and fingerprint
//! - [`reconcile`]: Snapshot-vs-catalog reconciliation

pub mod reconcile;
pub mod snapshot;
pub mod sources;
