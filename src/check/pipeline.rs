//! The update-check run
//!
//! One run opens a single browser session, resets every configured program's
//! previous result, then visits each program's page in catalog order. A
//! failure on one program is recorded against that program and the run moves
//! on; only environment and catalog failures abort the run. The session is
//! closed on every exit path, including cancellation and errors.

use std::time::Duration;

use tracing::{debug, info, warn};

use chrono::Utc;

use crate::catalog::record::{
    ConfigurationError, ConfigurationStatus, ProgramRecord, VersionSearchBehavior,
    VersionSearchMethod,
};
use crate::catalog::state::CachedState;
use crate::catalog::store::{CatalogStore, with_transaction};
use crate::check::driver::AutomationDriver;
use crate::check::environment::{EnvironmentProbe, resolve_user_agent};
use crate::check::error::{CheckError, CheckStepError, EnvironmentError};
use crate::config::{CheckConfig, MAX_POST_LOAD_DELAY_MS};
use crate::task::CancelToken;
use crate::version::extract;
use crate::version::model::{self, MAX_VERSION_SEGMENTS, MIN_VERSION_SEGMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Completed,
    Cancelled,
}

pub struct UpdateCheckPipeline {
    config: CheckConfig,
}

impl UpdateCheckPipeline {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Checks every configured program in `programs` and records the results
    /// through `store`. Progress is reported as a fraction in `0.0..=1.0`.
    pub async fn run<D, P, S, F>(
        &self,
        programs: &[ProgramRecord],
        driver: &D,
        probe: &P,
        store: &S,
        state: &mut CachedState,
        on_progress: F,
        cancel: &CancelToken,
    ) -> Result<CheckOutcome, CheckError>
    where
        D: AutomationDriver + ?Sized,
        P: EnvironmentProbe + ?Sized,
        S: CatalogStore + ?Sized,
        F: Fn(f64),
    {
        probe.ensure_ready().await?;
        let user_agent = match &self.config.custom_user_agent {
            Some(agent) => agent.clone(),
            None => resolve_user_agent(probe, store, state).await?,
        };
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Cancelled);
        }

        driver
            .open(
                Some(&user_agent),
                Duration::from_millis(self.config.page_load_timeout),
            )
            .await
            .map_err(|e| {
                warn!("Failed to open browser session: {e}");
                EnvironmentError::BrowserSessionFailed
            })?;

        // From here on the session is open; close it whatever happens.
        let result = self
            .run_checks(programs, driver, store, state, &on_progress, cancel)
            .await;
        driver.quit().await;
        result
    }

    async fn run_checks<D, S, F>(
        &self,
        programs: &[ProgramRecord],
        driver: &D,
        store: &S,
        state: &mut CachedState,
        on_progress: &F,
        cancel: &CancelToken,
    ) -> Result<CheckOutcome, CheckError>
    where
        D: AutomationDriver + ?Sized,
        S: CatalogStore + ?Sized,
        F: Fn(f64),
    {
        let configured: Vec<&ProgramRecord> = programs
            .iter()
            .filter(|p| p.is_update_check_configured)
            .collect();

        with_transaction(store, || store.reset_configured_programs())?;
        touch_check_time(store, state);

        let total = configured.len();
        info!("Checking {total} configured programs for updates");
        let outcome = 'run: {
            for (i, program) in configured.iter().enumerate() {
                if cancel.is_cancelled() {
                    break 'run CheckOutcome::Cancelled;
                }
                match self.check_one(program, driver, cancel).await {
                    Ok(None) => break 'run CheckOutcome::Cancelled,
                    Ok(Some(version)) => {
                        debug!("Found latest version {version} for {}", program.name);
                        store.update_latest_version(&program.name, &version)?;
                        if !program.skipped_version.is_empty()
                            && model::is_version_newer(
                                &version,
                                &program.skipped_version,
                                program.treat_standalone_number_as_version,
                            )
                            .unwrap_or(false)
                        {
                            store.unskip_version(&program.name)?;
                        }
                        store.change_configuration_status(
                            &program.name,
                            ConfigurationStatus::Valid,
                            ConfigurationError::None,
                        )?;
                    }
                    Err(step) => {
                        warn!("Update check failed for {}: {step}", program.name);
                        store.update_latest_version(&program.name, "")?;
                        store.change_configuration_status(
                            &program.name,
                            ConfigurationStatus::Invalid,
                            step.as_configuration_error(),
                        )?;
                    }
                }
                on_progress((i + 1) as f64 / total as f64);
            }
            on_progress(1.0);
            CheckOutcome::Completed
        };

        // The attempt timestamp is refreshed whether the run completed or was
        // cancelled.
        touch_check_time(store, state);
        Ok(outcome)
    }

    /// Checks one program's page. `Ok(None)` means cancellation was observed
    /// at a checkpoint; any other result is that program's outcome.
    async fn check_one<D>(
        &self,
        program: &ProgramRecord,
        driver: &D,
        cancel: &CancelToken,
    ) -> Result<Option<String>, CheckStepError>
    where
        D: AutomationDriver + ?Sized,
    {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        driver
            .navigate_to(&program.web_page_url)
            .await
            .map_err(|_| CheckStepError::WebpageDidNotRespond)?;

        let delay_ms = program.web_page_post_load_delay_ms.min(MAX_POST_LOAD_DELAY_MS);
        if delay_ms > 0 {
            cancel.delay(Duration::from_millis(delay_ms)).await;
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        // Clicks are best effort; a page that renders the version without
        // them should still check successfully.
        for instruction in &program.locating_instructions {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            if let Err(e) = driver.click_element(instruction, cancel).await {
                debug!(
                    "Ignoring failed pre-extraction click for {}: {e}",
                    program.name
                );
            }
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let text = extract_search_text(program, driver).await?;
        let standalone = program.treat_standalone_number_as_version;
        let found = match program.version_search_behavior {
            VersionSearchBehavior::FirstMatch => extract::first_version_in(&text, standalone, false),
            VersionSearchBehavior::FirstMatchFromEnd => {
                extract::first_version_in(&text, standalone, true)
            }
            VersionSearchBehavior::NewestOfAllMatches => {
                extract::latest_version_in(&text, standalone)
            }
            VersionSearchBehavior::Unknown => {
                return Err(CheckStepError::GeneralFailure(
                    "version search behavior is not configured".to_string(),
                ));
            }
        };
        let raw = found.ok_or(CheckStepError::NoVersionFound)?;
        let version = model::normalize_and_trim_version(
            &raw,
            MIN_VERSION_SEGMENTS,
            MAX_VERSION_SEGMENTS,
            false,
        )
        .map_err(|_| CheckStepError::NoVersionFound)?;
        Ok(Some(version))
    }
}

/// Obtains the text to search for a version, per the program's configured
/// method.
///
/// Marker windows slice the whole page text around the first occurrence of
/// each marker; when the end marker sits before the end of the start marker
/// the window is empty rather than an error.
async fn extract_search_text<D>(
    program: &ProgramRecord,
    driver: &D,
) -> Result<String, CheckStepError>
where
    D: AutomationDriver + ?Sized,
{
    let arg_1 = &program.version_search_argument_1;
    let arg_2 = &program.version_search_argument_2;
    match program.version_search_method {
        VersionSearchMethod::InElementById => driver
            .text_in_element_by_id(arg_1)
            .await
            .map_err(|_| CheckStepError::ElementNotFound),
        VersionSearchMethod::InElementsMatchingPath => {
            let texts = driver
                .texts_in_elements_matching(arg_1)
                .await
                .map_err(|_| CheckStepError::ElementNotFound)?;
            if texts.is_empty() {
                return Err(CheckStepError::ElementNotFound);
            }
            Ok(texts.join(" "))
        }
        VersionSearchMethod::WholePage => page_text(driver).await,
        VersionSearchMethod::AfterMarker => {
            let page = page_text(driver).await?;
            let at = page.find(arg_1.as_str()).ok_or(CheckStepError::TextNotFound)?;
            Ok(page[at + arg_1.len()..].to_string())
        }
        VersionSearchMethod::BeforeMarker => {
            let page = page_text(driver).await?;
            let at = page.find(arg_1.as_str()).ok_or(CheckStepError::TextNotFound)?;
            Ok(page[..at].to_string())
        }
        VersionSearchMethod::BetweenMarkers => {
            let page = page_text(driver).await?;
            let start = page.find(arg_1.as_str()).ok_or(CheckStepError::TextNotFound)?;
            let end = page.find(arg_2.as_str()).ok_or(CheckStepError::TextNotFound)?;
            let window_start = start + arg_1.len();
            if end >= window_start {
                Ok(page[window_start..end].to_string())
            } else {
                Ok(String::new())
            }
        }
        VersionSearchMethod::Unknown => Err(CheckStepError::GeneralFailure(
            "version search method is not configured".to_string(),
        )),
    }
}

async fn page_text<D>(driver: &D) -> Result<String, CheckStepError>
where
    D: AutomationDriver + ?Sized,
{
    driver
        .page_text()
        .await
        .map_err(|e| CheckStepError::GeneralFailure(e.to_string()))
}

fn touch_check_time<S: CatalogStore + ?Sized>(store: &S, state: &mut CachedState) {
    state.last_check_time = Some(Utc::now());
    if let Err(e) = store.save_state(state) {
        warn!("Failed to persist last check time: {e}");
    }
}
