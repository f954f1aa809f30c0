//! Snapshot scanner and fingerprint
//!
//! Walks every source entry once, normalizes it into a candidate program
//! record, folds duplicate names across sources, and hashes the raw
//! observations into a fingerprint that lets the reconciler skip unchanged
//! catalogs.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::catalog::record::InstallationScope;
use crate::scan::sources::ProgramSource;
use crate::task::CancelToken;
use crate::version::extract::strip_first_version;
use crate::version::model::{
    self, MAX_VERSION_SEGMENTS, MIN_VERSION_SEGMENTS, ValidationMode,
};

/// One deduplicated program observed by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredProgram {
    pub name: String,
    /// Normalized installed version, or empty when none could be parsed.
    pub installed_version: String,
    pub installation_scope: InstallationScope,
}

/// Name-keyed scan result plus its content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub programs: IndexMap<String, DiscoveredProgram>,
    /// Hash over every raw (name, version, scope, bitness) observation.
    /// A collision merely makes the next reconciliation a no-op, so the
    /// fingerprint is only ever used as a cheap equality oracle.
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(Snapshot),
    Cancelled,
}

/// Enumerates every source and produces a deduplicated snapshot.
///
/// Cancellation is checked once per entry; on cancellation the scan returns
/// immediately and nothing downstream is touched.
pub fn scan_installed_programs(
    sources: &[&dyn ProgramSource],
    cancel: &CancelToken,
) -> ScanOutcome {
    let mut fingerprint_input = String::new();
    let mut programs: IndexMap<String, DiscoveredProgram> = IndexMap::new();

    for source in sources {
        let kind = source.kind();
        let entries = match source.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping unavailable source {:?}: {}", kind, e);
                continue;
            }
        };
        debug!("Source {:?} yielded {} entries", kind, entries.len());

        let scope = kind.installation_scope();
        for entry in entries {
            if cancel.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            let Some(raw_name) = entry.display_name else {
                continue;
            };

            let mut version = entry.display_version.and_then(normalize_raw_version);

            fingerprint_input.push_str(&raw_name);
            fingerprint_input.push_str(version.as_deref().unwrap_or(""));
            fingerprint_input.push_str(&scope.as_i64().to_string());
            if scope == InstallationScope::Everyone {
                fingerprint_input.push_str(kind.bitness_tag());
            }

            // The display name often carries the version ("7-Zip 19.00");
            // strip it, and promote it when no separate version field exists.
            let (name, version_from_name) =
                strip_first_version(raw_name.trim(), false, false, true);
            if version.as_deref().unwrap_or("").is_empty() {
                version = version_from_name.or(version);
            }
            let installed_version = version.unwrap_or_default();

            match programs.get_mut(&name) {
                None => {
                    programs.insert(
                        name.clone(),
                        DiscoveredProgram {
                            name,
                            installed_version,
                            installation_scope: scope,
                        },
                    );
                }
                Some(existing) if !installed_version.is_empty() => {
                    let newer = existing.installed_version.is_empty()
                        || model::is_version_newer(
                            &installed_version,
                            &existing.installed_version,
                            false,
                        )
                        .unwrap_or(false);
                    if newer {
                        existing.installed_version = installed_version;
                        existing.installation_scope = scope;
                    }
                }
                Some(_) => {}
            }
        }
    }

    ScanOutcome::Completed(Snapshot {
        programs,
        fingerprint: fingerprint_hash(&fingerprint_input),
    })
}

/// Validates a raw registry version value, stripping foreign characters
/// first when the string does not pass strictly, and normalizing the result
/// to the catalog's segment bounds. An unparseable value is dropped, not an
/// error.
fn normalize_raw_version(raw: String) -> Option<String> {
    let candidate: String = if model::is_version(&raw, ValidationMode::CountStrict) {
        raw
    } else {
        raw.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect()
    };
    if candidate.is_empty() {
        return None;
    }
    model::normalize_and_trim_version(
        &candidate,
        MIN_VERSION_SEGMENTS,
        MAX_VERSION_SEGMENTS,
        false,
    )
    .ok()
}

fn fingerprint_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut rendered = String::with_capacity(digest.len() * 2);
    for byte in digest {
        rendered.push_str(&format!("{byte:02x}"));
    }
    rendered
}
