//! Update-check failure taxonomy
//!
//! Environment failures abort the whole run before any page is visited.
//! Step failures are scoped to one program: they are recorded against its
//! record and the run moves on.

use thiserror::Error;

use crate::catalog::error::CatalogError;
use crate::catalog::record::ConfigurationError;

/// Precondition failures that make an update-check run impossible.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("no automation driver is installed")]
    NoDriverInstalled,

    #[error("the automation driver exists but cannot be executed")]
    DriverInaccessible,

    #[error("no compatible browser is installed")]
    BrowserNotInstalled,

    #[error("the browser exists but cannot be executed")]
    BrowserInaccessible,

    #[error("the browser's default user agent could not be determined")]
    UserAgentUnavailable,

    #[error("the browser session could not be opened")]
    BrowserSessionFailed,
}

/// A failure while checking one program. Each variant maps onto the
/// [`ConfigurationError`] persisted on the program's record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckStepError {
    #[error("web page did not respond")]
    WebpageDidNotRespond,

    #[error("element not found in web page")]
    ElementNotFound,

    #[error("search text not found in web page")]
    TextNotFound,

    #[error("no version found in the extracted text")]
    NoVersionFound,

    #[error("update check failed: {0}")]
    GeneralFailure(String),
}

impl CheckStepError {
    pub fn as_configuration_error(&self) -> ConfigurationError {
        match self {
            CheckStepError::WebpageDidNotRespond => ConfigurationError::WebpageDidNotRespond,
            CheckStepError::ElementNotFound => ConfigurationError::ElementNotFound,
            CheckStepError::TextNotFound => ConfigurationError::TextNotFound,
            CheckStepError::NoVersionFound => ConfigurationError::NoVersionFound,
            CheckStepError::GeneralFailure(_) => ConfigurationError::GeneralFailure,
        }
    }
}

/// A failure that aborts an update-check run as a whole.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
