//! Core engine for tracking installed programs and checking vendor web pages
//! for newer versions.
//!
//! The crate owns no user interface: the surrounding application supplies the
//! OS installed-program sources, the browser automation driver and the
//! scheduling glue, and drives the pieces exposed here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Scanner   │────▶│  Reconciler │────▶│   Catalog   │
//! │ (snapshot)  │     │   (diff)    │     │  (sqlite)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//! ┌─────────────┐     ┌─────────────┐            │
//! │   Driver    │◀────│   Pipeline  │────────────┘
//! │ (browser)   │     │ (per-check) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version`]: Validation, comparison and extraction of version strings
//! - [`catalog`]: Persisted program catalog and its storage contract
//! - [`scan`]: Installed-program snapshot scanning and catalog reconciliation
//! - [`check`]: The update-check pipeline driving the automation driver
//! - [`task`]: Cooperative cancellation primitives
//! - [`config`]: Constants, data paths and check configuration
//! - [`logging`]: File-based tracing setup for host applications

pub mod catalog;
pub mod check;
pub mod config;
pub mod logging;
pub mod scan;
pub mod task;
pub mod version;
