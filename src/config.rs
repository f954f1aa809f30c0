use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default page-load timeout for the automation driver in milliseconds (10 seconds)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Upper bound for the configurable post-load delay in milliseconds
pub const MAX_POST_LOAD_DELAY_MS: u64 = 5_000;

/// Polling interval for cooperative cancellation checks during waits (50ms)
pub const CANCEL_POLL_INTERVAL_MS: u64 = 50;

/// Check configuration supplied by the host application
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    /// Page-load timeout for the automation driver in milliseconds
    pub page_load_timeout: u64,
    /// Overrides the driver's default user-agent string when set
    pub custom_user_agent: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT_MS,
            custom_user_agent: None,
        }
    }
}

/// Returns the path to the data directory for upwatch.
/// Uses $XDG_DATA_HOME/upwatch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/upwatch,
/// or ./upwatch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the catalog database file.
pub fn db_path() -> PathBuf {
    data_dir().join("catalog.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("upwatch.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("upwatch")
}
