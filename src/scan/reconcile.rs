//! Snapshot-vs-catalog reconciliation
//!
//! Runs only when the snapshot fingerprint differs from the last persisted
//! one; an unchanged machine costs one string comparison instead of a full
//! catalog write pass. The write pass itself is two store transactions:
//! phase one updates or clears installation info on existing records, phase
//! two inserts the programs the catalog has never seen.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::catalog::error::CatalogError;
use crate::catalog::record::{InstallationScope, ProgramRecord};
use crate::catalog::state::CachedState;
use crate::catalog::store::{CatalogStore, with_transaction};
use crate::scan::snapshot::{DiscoveredProgram, Snapshot};
use crate::version::model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Fingerprint unchanged; no catalog write was performed.
    Skipped,
    /// Catalog updated. `state_saved` is false when the new fingerprint
    /// could not be persisted; the in-memory value was reverted so the next
    /// run retries (re-running against an unchanged snapshot is a no-op).
    Applied { state_saved: bool },
}

/// Diffs `snapshot` against the catalog and writes the differences.
pub fn reconcile_catalog<S: CatalogStore + ?Sized>(
    store: &S,
    snapshot: &Snapshot,
    state: &mut CachedState,
) -> Result<ReconcileOutcome, CatalogError> {
    if state.last_fingerprint == snapshot.fingerprint {
        debug!("Fingerprint unchanged, skipping reconciliation");
        return Ok(ReconcileOutcome::Skipped);
    }

    let mut pending: IndexMap<&str, &DiscoveredProgram> = snapshot
        .programs
        .iter()
        .map(|(name, program)| (name.as_str(), program))
        .collect();

    // Phase 1: refresh or clear installation info on existing records.
    with_transaction(store, || {
        for (name, record) in store.programs()? {
            let installed_version = match pending.shift_remove(name.as_str()) {
                Some(found) => {
                    store.update_installation_info(
                        &name,
                        &found.installed_version,
                        found.installation_scope,
                    )?;
                    found.installed_version.clone()
                }
                None => {
                    // Gone from the machine; keep the record so manual
                    // configuration survives a reinstall.
                    store.update_installation_info(&name, "", InstallationScope::None)?;
                    String::new()
                }
            };
            if should_unskip(&record, &installed_version) {
                store.unskip_version(&name)?;
            }
        }
        Ok(())
    })?;

    // Phase 2: insert newly discovered programs.
    with_transaction(store, || {
        for program in pending.values() {
            store.add_program(&ProgramRecord::automatically_added(
                &program.name,
                &program.installed_version,
                program.installation_scope,
            ))?;
        }
        Ok(())
    })?;
    info!(
        "Reconciled catalog: {} programs in snapshot",
        snapshot.programs.len()
    );

    let previous_fingerprint =
        std::mem::replace(&mut state.last_fingerprint, snapshot.fingerprint.clone());
    if let Err(e) = store.save_state(state) {
        warn!("Failed to persist scan fingerprint, will retry next run: {e}");
        state.last_fingerprint = previous_fingerprint;
        return Ok(ReconcileOutcome::Applied { state_saved: false });
    }

    Ok(ReconcileOutcome::Applied { state_saved: true })
}

/// A skipped version only stays meaningful while it is ahead of what is
/// installed.
fn should_unskip(record: &ProgramRecord, installed_version: &str) -> bool {
    if record.skipped_version.is_empty() || installed_version.is_empty() {
        return false;
    }
    !model::is_version_newer(&record.skipped_version, installed_version, false).unwrap_or(true)
}
