use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use upwatch::catalog::record::{
    ConfigurationError, ConfigurationStatus, LocatingInstruction, ProgramRecord,
    VersionSearchBehavior, VersionSearchMethod,
};
use upwatch::catalog::sqlite::SqliteCatalog;
use upwatch::catalog::store::CatalogStore;
use upwatch::check::driver::{AutomationDriver, DriverError};
use upwatch::check::environment::EnvironmentProbe;
use upwatch::check::error::{CheckError, EnvironmentError};
use upwatch::check::pipeline::{CheckOutcome, UpdateCheckPipeline};
use upwatch::config::CheckConfig;
use upwatch::task::CancelToken;

/// Serves canned page texts keyed by URL; the rest of the driver surface
/// fails, which is enough for whole-page and marker based searches.
#[derive(Default)]
struct FakeDriver {
    pages: HashMap<String, String>,
    unreachable: HashSet<String>,
    cancel_on_navigate_to: Option<(String, CancelToken)>,
    current: Mutex<Option<String>>,
    quits: AtomicUsize,
}

impl FakeDriver {
    fn with_page(mut self, url: &str, page: &str) -> Self {
        self.pages.insert(url.to_string(), page.to_string());
        self
    }

    fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }
}

#[async_trait::async_trait]
impl AutomationDriver for FakeDriver {
    async fn open<'a>(
        &self,
        _user_agent: Option<&'a str>,
        _page_load_timeout: Duration,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn navigate_to(&self, url: &str) -> Result<(), DriverError> {
        if let Some((trigger, cancel)) = &self.cancel_on_navigate_to {
            if trigger == url {
                cancel.cancel();
            }
        }
        if self.unreachable.contains(url) {
            return Err(DriverError("navigation timed out".to_string()));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn text_in_element_by_id(&self, _id: &str) -> Result<String, DriverError> {
        Err(DriverError("no such element".to_string()))
    }

    async fn texts_in_elements_matching(&self, _path: &str) -> Result<Vec<String>, DriverError> {
        Err(DriverError("no such element".to_string()))
    }

    async fn page_text(&self) -> Result<String, DriverError> {
        let current = self.current.lock().unwrap();
        let url = current.as_deref().ok_or_else(|| {
            DriverError("no page loaded".to_string())
        })?;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DriverError("no page loaded".to_string()))
    }

    async fn click_element(
        &self,
        _instruction: &LocatingInstruction,
        _cancel: &CancelToken,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn quit(&self) {
        self.quits.fetch_add(1, Ordering::SeqCst);
    }
}

struct StubProbe {
    ready: Result<(), EnvironmentError>,
}

impl StubProbe {
    fn ready() -> Self {
        Self { ready: Ok(()) }
    }
}

#[async_trait::async_trait]
impl EnvironmentProbe for StubProbe {
    async fn ensure_ready(&self) -> Result<(), EnvironmentError> {
        self.ready
    }

    async fn browser_checksum(&self) -> Result<String, EnvironmentError> {
        Ok("checksum".to_string())
    }

    async fn default_user_agent(&self) -> Result<String, EnvironmentError> {
        Ok("Mozilla/5.0 (test)".to_string())
    }
}

fn whole_page_program(name: &str, url: &str) -> ProgramRecord {
    ProgramRecord {
        name: name.to_string(),
        is_update_check_configured: true,
        web_page_url: url.to_string(),
        version_search_method: VersionSearchMethod::WholePage,
        version_search_behavior: VersionSearchBehavior::FirstMatch,
        ..ProgramRecord::default()
    }
}

fn open_catalog(dir: &TempDir) -> SqliteCatalog {
    SqliteCatalog::open(&dir.path().join("catalog.db")).unwrap()
}

async fn run_pipeline(
    catalog: &SqliteCatalog,
    driver: &FakeDriver,
    cancel: &CancelToken,
) -> Result<CheckOutcome, CheckError> {
    let programs: Vec<ProgramRecord> = catalog.programs().unwrap().into_values().collect();
    let mut state = catalog.load_state().unwrap();
    UpdateCheckPipeline::new(CheckConfig::default())
        .run(
            &programs,
            driver,
            &StubProbe::ready(),
            catalog,
            &mut state,
            |_| {},
            cancel,
        )
        .await
}

#[tokio::test]
async fn a_full_run_records_success_and_failure_per_program() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir);
    let mut marked = whole_page_program("Marked", "https://marked.example");
    marked.version_search_method = VersionSearchMethod::BetweenMarkers;
    marked.version_search_argument_1 = "Version:".to_string();
    marked.version_search_argument_2 = "(stable)".to_string();
    catalog.add_program(&marked).unwrap();
    catalog
        .add_program(&whole_page_program("Blank", "https://blank.example"))
        .unwrap();
    let driver = FakeDriver::default()
        .with_page(
            "https://marked.example",
            "Download Version: 4.5.6 (stable) now, or 9.9.9 nightly",
        )
        .with_page("https://blank.example", "no numbers to be found here");

    let outcome = run_pipeline(&catalog, &driver, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, CheckOutcome::Completed);
    let programs = catalog.programs().unwrap();
    assert_eq!(programs["Marked"].latest_version, "4.5.6");
    assert_eq!(
        programs["Marked"].update_check_configuration_status,
        ConfigurationStatus::Valid
    );
    assert_eq!(programs["Blank"].latest_version, "");
    assert_eq!(
        programs["Blank"].update_check_configuration_status,
        ConfigurationStatus::Invalid
    );
    assert_eq!(
        programs["Blank"].update_check_configuration_error,
        ConfigurationError::NoVersionFound
    );
    assert_eq!(driver.quits.load(Ordering::SeqCst), 1);
    assert!(catalog.load_state().unwrap().last_check_time.is_some());
}

#[tokio::test]
async fn an_unreachable_page_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir);
    catalog
        .add_program(&whole_page_program("Down", "https://down.example"))
        .unwrap();
    catalog
        .add_program(&whole_page_program("Up", "https://up.example"))
        .unwrap();
    let driver = FakeDriver::default()
        .with_unreachable("https://down.example")
        .with_page("https://up.example", "current release 7.0.1");

    let outcome = run_pipeline(&catalog, &driver, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, CheckOutcome::Completed);
    let programs = catalog.programs().unwrap();
    assert_eq!(
        programs["Down"].update_check_configuration_error,
        ConfigurationError::WebpageDidNotRespond
    );
    assert_eq!(programs["Up"].latest_version, "7.0.1");
}

#[tokio::test]
async fn cancellation_leaves_remaining_programs_unknown_and_closes_the_session() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir);
    catalog
        .add_program(&whole_page_program("First", "https://first.example"))
        .unwrap();
    catalog
        .add_program(&whole_page_program("Second", "https://second.example"))
        .unwrap();
    let cancel = CancelToken::new();
    let mut driver = FakeDriver::default()
        .with_page("https://first.example", "version 1.1")
        .with_page("https://second.example", "version 2.2");
    driver.cancel_on_navigate_to = Some(("https://second.example".to_string(), cancel.clone()));

    let outcome = run_pipeline(&catalog, &driver, &cancel).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Cancelled);
    let programs = catalog.programs().unwrap();
    assert_eq!(programs["First"].latest_version, "1.1");
    assert_eq!(
        programs["Second"].update_check_configuration_status,
        ConfigurationStatus::Unknown
    );
    assert_eq!(programs["Second"].latest_version, "");
    assert_eq!(driver.quits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_missing_driver_aborts_before_any_catalog_write() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir);
    let mut record = whole_page_program("Foo", "https://foo.example");
    record.latest_version = "1.0".to_string();
    record.update_check_configuration_status = ConfigurationStatus::Valid;
    catalog.add_program(&record).unwrap();
    let driver = FakeDriver::default();
    let probe = StubProbe {
        ready: Err(EnvironmentError::NoDriverInstalled),
    };
    let programs: Vec<ProgramRecord> = catalog.programs().unwrap().into_values().collect();
    let mut state = catalog.load_state().unwrap();

    let result = UpdateCheckPipeline::new(CheckConfig::default())
        .run(
            &programs,
            &driver,
            &probe,
            &catalog,
            &mut state,
            |_| {},
            &CancelToken::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(CheckError::Environment(EnvironmentError::NoDriverInstalled))
    ));
    // The previous results were not reset.
    assert_eq!(catalog.programs().unwrap()["Foo"].latest_version, "1.0");
    assert_eq!(driver.quits.load(Ordering::SeqCst), 0);
}
