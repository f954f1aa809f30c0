//! Browser environment preconditions
//!
//! The probe answers three questions before any page is visited: is the
//! driver usable, which browser build is installed, and what user agent does
//! that build send. The user agent is expensive to measure (it launches the
//! browser), so it is cached in [`CachedState`] keyed by the browser
//! executable's checksum.

#[cfg(test)]
use mockall::automock;

use tracing::{debug, warn};

use crate::catalog::state::CachedState;
use crate::catalog::store::CatalogStore;
use crate::check::error::{CheckError, EnvironmentError};

/// Host-supplied view of the installed driver and browser.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait EnvironmentProbe: Send + Sync {
    /// Verifies the automation driver and the browser are installed and
    /// executable.
    async fn ensure_ready(&self) -> Result<(), EnvironmentError>;

    /// Content checksum of the installed browser executable.
    async fn browser_checksum(&self) -> Result<String, EnvironmentError>;

    /// Launches the browser once to read the user agent it sends.
    async fn default_user_agent(&self) -> Result<String, EnvironmentError>;
}

/// Returns the browser's default user agent, measuring it only when the
/// installed browser build changed since the last run.
///
/// A failure to persist the refreshed cache is downgraded to a warning and
/// the in-memory values are reverted; the resolved agent is still returned.
pub async fn resolve_user_agent<P, S>(
    probe: &P,
    store: &S,
    state: &mut CachedState,
) -> Result<String, CheckError>
where
    P: EnvironmentProbe + ?Sized,
    S: CatalogStore + ?Sized,
{
    let checksum = probe.browser_checksum().await?;
    if checksum == state.last_browser_checksum && !state.last_user_agent.is_empty() {
        debug!("Browser unchanged, reusing cached user agent");
        return Ok(state.last_user_agent.clone());
    }

    let user_agent = probe.default_user_agent().await?;
    let previous_checksum = std::mem::replace(&mut state.last_browser_checksum, checksum);
    let previous_agent = std::mem::replace(&mut state.last_user_agent, user_agent.clone());
    if let Err(e) = store.save_state(state) {
        warn!("Failed to persist user-agent cache: {e}");
        state.last_browser_checksum = previous_checksum;
        state.last_user_agent = previous_agent;
    }

    Ok(user_agent)
}
