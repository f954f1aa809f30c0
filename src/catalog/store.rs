//! Storage contract consumed by the scan and check subsystems

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;
use tracing::warn;

use crate::catalog::error::CatalogError;
use crate::catalog::record::{
    ConfigurationError, ConfigurationStatus, InstallationScope, ProgramRecord,
};
use crate::catalog::state::CachedState;

/// The catalog operations the core relies on.
///
/// Transaction granularity is the caller's business: the reconciler wraps
/// each of its phases, the pipeline wraps its catalog-wide reset, and every
/// other write stands alone. The store only promises that writes between
/// `begin_transaction` and `commit_transaction` land atomically. An open
/// transaction must be closed with `commit_transaction` or
/// `rollback_transaction` before the next one begins; [`with_transaction`]
/// wraps that bookkeeping.
#[cfg_attr(test, automock)]
pub trait CatalogStore: Send + Sync {
    fn begin_transaction(&self) -> Result<(), CatalogError>;
    fn commit_transaction(&self) -> Result<(), CatalogError>;
    fn rollback_transaction(&self) -> Result<(), CatalogError>;

    /// Every record, keyed by name, in catalog insertion order.
    fn programs(&self) -> Result<IndexMap<String, ProgramRecord>, CatalogError>;

    fn add_program(&self, record: &ProgramRecord) -> Result<(), CatalogError>;
    fn update_program(&self, name: &str, record: &ProgramRecord) -> Result<(), CatalogError>;

    fn update_installation_info(
        &self,
        name: &str,
        installed_version: &str,
        scope: InstallationScope,
    ) -> Result<(), CatalogError>;

    fn update_latest_version(&self, name: &str, latest_version: &str)
    -> Result<(), CatalogError>;

    fn change_configuration_status(
        &self,
        name: &str,
        status: ConfigurationStatus,
        error: ConfigurationError,
    ) -> Result<(), CatalogError>;

    /// Clears the latest version and resets status to `Unknown` for every
    /// program with a non-empty update-check configuration.
    fn reset_configured_programs(&self) -> Result<(), CatalogError>;

    /// Clears a user-skipped version.
    fn unskip_version(&self, name: &str) -> Result<(), CatalogError>;

    fn hide_program(&self, name: &str) -> Result<(), CatalogError>;
    fn unhide_program(&self, name: &str) -> Result<(), CatalogError>;
    fn remove_program(&self, name: &str) -> Result<(), CatalogError>;

    fn load_state(&self) -> Result<CachedState, CatalogError>;
    fn save_state(&self, state: &CachedState) -> Result<(), CatalogError>;
}

/// Runs `f` inside one transaction, committing on success and rolling back
/// on any failure so the store never stays stuck in an open transaction.
pub fn with_transaction<S, T>(
    store: &S,
    f: impl FnOnce() -> Result<T, CatalogError>,
) -> Result<T, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    store.begin_transaction()?;
    match f() {
        Ok(value) => {
            if let Err(e) = store.commit_transaction() {
                rollback_quietly(store);
                return Err(e);
            }
            Ok(value)
        }
        Err(e) => {
            rollback_quietly(store);
            Err(e)
        }
    }
}

fn rollback_quietly<S: CatalogStore + ?Sized>(store: &S) {
    if let Err(e) = store.rollback_transaction() {
        warn!("Failed to roll back catalog transaction: {e}");
    }
}
