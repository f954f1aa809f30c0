//! Cached cross-run state
//!
//! These values were historically process-wide globals; they are modeled as
//! an explicit value passed by reference and persisted through the catalog
//! store so a run can revert them when a save fails.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedState {
    /// Fingerprint of the installed-program set from the last applied scan;
    /// equality with a fresh snapshot short-circuits reconciliation.
    pub last_fingerprint: String,
    /// Content hash of the browser executable the cached user agent belongs
    /// to; the agent is recomputed only when this changes.
    pub last_browser_checksum: String,
    /// Driver-compatible user-agent string resolved for that browser build.
    pub last_user_agent: String,
    /// When the last update-check run was attempted.
    pub last_check_time: Option<DateTime<Utc>>,
}
