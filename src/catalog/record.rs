//! Program records and their configuration enums
//!
//! A record's identity is its name (case-significant, unique within the
//! catalog). Installation fields are owned by the scanner/reconciler, the
//! latest-version and status fields by the update-check pipeline; everything
//! else is user configuration.

use serde::{Deserialize, Serialize};

/// Where an installed program was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InstallationScope {
    #[default]
    None,
    Everyone,
    CurrentUserOnly,
}

impl InstallationScope {
    pub fn as_i64(self) -> i64 {
        match self {
            InstallationScope::None => 0,
            InstallationScope::Everyone => 1,
            InstallationScope::CurrentUserOnly => 2,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => InstallationScope::Everyone,
            2 => InstallationScope::CurrentUserOnly,
            _ => InstallationScope::None,
        }
    }
}

/// How the raw text containing the version is obtained from the web page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VersionSearchMethod {
    #[default]
    Unknown,
    /// Content of the element with id = argument 1.
    InElementById,
    /// Concatenated content of every element matching the path expression in
    /// argument 1.
    InElementsMatchingPath,
    /// The whole page text.
    WholePage,
    /// Page text after the first occurrence of the marker in argument 1.
    AfterMarker,
    /// Page text before the first occurrence of the marker in argument 1.
    BeforeMarker,
    /// Page text between the markers in arguments 1 and 2.
    BetweenMarkers,
}

impl VersionSearchMethod {
    pub fn as_i64(self) -> i64 {
        match self {
            VersionSearchMethod::Unknown => 0,
            VersionSearchMethod::InElementById => 1,
            VersionSearchMethod::InElementsMatchingPath => 2,
            VersionSearchMethod::WholePage => 3,
            VersionSearchMethod::AfterMarker => 4,
            VersionSearchMethod::BeforeMarker => 5,
            VersionSearchMethod::BetweenMarkers => 6,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => VersionSearchMethod::InElementById,
            2 => VersionSearchMethod::InElementsMatchingPath,
            3 => VersionSearchMethod::WholePage,
            4 => VersionSearchMethod::AfterMarker,
            5 => VersionSearchMethod::BeforeMarker,
            6 => VersionSearchMethod::BetweenMarkers,
            _ => VersionSearchMethod::Unknown,
        }
    }
}

/// Which of the versions found in the extracted text wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VersionSearchBehavior {
    #[default]
    Unknown,
    FirstMatch,
    FirstMatchFromEnd,
    NewestOfAllMatches,
}

impl VersionSearchBehavior {
    pub fn as_i64(self) -> i64 {
        match self {
            VersionSearchBehavior::Unknown => 0,
            VersionSearchBehavior::FirstMatch => 1,
            VersionSearchBehavior::FirstMatchFromEnd => 2,
            VersionSearchBehavior::NewestOfAllMatches => 3,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => VersionSearchBehavior::FirstMatch,
            2 => VersionSearchBehavior::FirstMatchFromEnd,
            3 => VersionSearchBehavior::NewestOfAllMatches,
            _ => VersionSearchBehavior::Unknown,
        }
    }
}

/// Outcome of the most recent update-check attempt for a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigurationStatus {
    #[default]
    Unknown,
    Invalid,
    Valid,
}

impl ConfigurationStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            ConfigurationStatus::Unknown => 0,
            ConfigurationStatus::Invalid => 1,
            ConfigurationStatus::Valid => 2,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => ConfigurationStatus::Invalid,
            2 => ConfigurationStatus::Valid,
            _ => ConfigurationStatus::Unknown,
        }
    }
}

/// Specific failure recorded alongside [`ConfigurationStatus::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigurationError {
    #[default]
    None,
    GeneralFailure,
    WebpageDidNotRespond,
    ElementNotFound,
    TextNotFound,
    NoVersionFound,
}

impl ConfigurationError {
    pub fn as_i64(self) -> i64 {
        match self {
            ConfigurationError::None => 0,
            ConfigurationError::GeneralFailure => 1,
            ConfigurationError::WebpageDidNotRespond => 2,
            ConfigurationError::ElementNotFound => 3,
            ConfigurationError::TextNotFound => 4,
            ConfigurationError::NoVersionFound => 5,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => ConfigurationError::GeneralFailure,
            2 => ConfigurationError::WebpageDidNotRespond,
            3 => ConfigurationError::ElementNotFound,
            4 => ConfigurationError::TextNotFound,
            5 => ConfigurationError::NoVersionFound,
            _ => ConfigurationError::None,
        }
    }
}

/// How a page element to click is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocatingMethod {
    #[default]
    Unspecified,
    ById,
    ByPathExpression,
}

/// One pre-extraction click step. Ordering is significant and preserved
/// exactly as configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocatingInstruction {
    pub method: LocatingMethod,
    pub argument: String,
    pub match_exact_text: bool,
    /// How long the driver may spend locating the element, in milliseconds.
    pub interval_ms: u64,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramRecord {
    pub name: String,
    pub installed_version: String,
    pub latest_version: String,
    pub skipped_version: String,
    pub installation_scope: InstallationScope,
    pub is_update_check_configured: bool,
    pub web_page_url: String,
    pub version_search_method: VersionSearchMethod,
    pub version_search_argument_1: String,
    pub version_search_argument_2: String,
    pub treat_standalone_number_as_version: bool,
    pub version_search_behavior: VersionSearchBehavior,
    /// Wait after navigation before extraction, clamped to
    /// [`crate::config::MAX_POST_LOAD_DELAY_MS`].
    pub web_page_post_load_delay_ms: u64,
    pub locating_instructions: Vec<LocatingInstruction>,
    pub is_automatically_added: bool,
    pub update_check_configuration_status: ConfigurationStatus,
    pub update_check_configuration_error: ConfigurationError,
    pub is_hidden: bool,
}

impl ProgramRecord {
    /// A brand-new record for a program the scanner discovered on its own:
    /// empty update-check configuration, status `Unknown`.
    pub fn automatically_added(
        name: &str,
        installed_version: &str,
        installation_scope: InstallationScope,
    ) -> Self {
        Self {
            name: name.to_string(),
            installed_version: installed_version.to_string(),
            installation_scope,
            is_automatically_added: true,
            ..Self::default()
        }
    }
}
