//! The installed-program enumeration seam
//!
//! Hosts supply one source per OS registry area. A source that cannot be
//! opened is not an error for the scan as a whole: it contributes zero
//! entries.

#[cfg(test)]
use mockall::automock;

use thiserror::Error;

use crate::catalog::record::InstallationScope;

/// The three logical installed-program registry areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    CurrentUser,
    System32Bit,
    System64Bit,
}

impl SourceKind {
    /// Fixed enumeration order; the fingerprint depends on it.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::CurrentUser,
        SourceKind::System32Bit,
        SourceKind::System64Bit,
    ];

    pub fn installation_scope(self) -> InstallationScope {
        match self {
            SourceKind::CurrentUser => InstallationScope::CurrentUserOnly,
            SourceKind::System32Bit | SourceKind::System64Bit => InstallationScope::Everyone,
        }
    }

    /// Bitness marker mixed into the fingerprint for system-wide sources so
    /// a program moving between the 32-bit and 64-bit areas changes it.
    pub(crate) fn bitness_tag(self) -> &'static str {
        match self {
            SourceKind::CurrentUser => "",
            SourceKind::System32Bit => "32",
            SourceKind::System64Bit => "64",
        }
    }
}

/// One raw registry entry. Either value may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledEntry {
    pub display_name: Option<String>,
    pub display_version: Option<String>,
}

#[derive(Debug, Error)]
#[error("installed-program source unavailable: {0}")]
pub struct SourceError(pub String);

/// Enumerates one installed-program registry area.
#[cfg_attr(test, automock)]
pub trait ProgramSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// All entries currently registered in this area.
    fn entries(&self) -> Result<Vec<InstalledEntry>, SourceError>;
}
