use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{Controller, RunState};
use crate::configuration::{Config, TargetConfig};
use crate::aggregation::RunResult;
use crate::error_handling::types::{ControllerError, StorageError};
use crate::extraction::{ERROR, NO_PRICE, UNKNOWN};
use crate::identity_rotation::Identity;
use crate::storage::{FileStorage, ResultStorage, StoredRun};
use crate::test_support::{StubDocument, StubLauncher, StubLookup, StubPage, StubRunner};

const HOTEL_URL: &str = "https://www.booking.com/hotel/nz/goodview-serviced-apartment.html";

fn config(root: &Path) -> Config {
    let mut config = Config {
        target: TargetConfig {
            url: Some(HOTEL_URL.into()),
        },
        ..Config::default()
    };
    config.session.root_dir = root.join("sessions").to_string_lossy().into_owned();
    config.output.screenshots_dir = root.join("screenshots").to_string_lossy().into_owned();
    config.output.dir = root.join("hotel_prices").to_string_lossy().into_owned();
    config
}

fn identity(name: &str) -> Identity {
    Identity::parse(name).unwrap()
}

fn priced_page(price: &str) -> StubPage {
    StubPage::new().with_document(
        StubDocument::new()
            .with("h2[data-testid='header-title']", &["Goodview Serviced Apartment"])
            .with(".bui-price-display__value", &[price]),
    )
}

fn controller(
    cfg: Config,
    launcher: &StubLauncher,
    runner: &StubRunner,
) -> Controller<StubLauncher, StubRunner, StubLookup> {
    Controller::new(cfg, launcher.clone(), runner.clone(), StubLookup::new("203.0.113.7"))
}

#[tokio::test(start_paused = true)]
async fn test_activation_failure_abandons_only_that_identity() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new()
        .with_listing("France, Japan, Brazil")
        .with_failing_connect("Japan");
    let launcher = StubLauncher::new(priced_page("€120")).then(priced_page("€140"));
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    assert_eq!(result.failed, vec![identity("Japan")]);
    assert_eq!(result.succeeded, vec![identity("France"), identity("Brazil")]);
    let attempted: Vec<&str> = result.records.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(attempted, ["France", "Brazil"]);

    assert!(runner.count("disconnect") >= 2);
    assert_eq!(runner.calls().first().map(String::as_str), Some("nordvpn countries"));
    assert_eq!(runner.calls().get(1).map(String::as_str), Some("nordvpn disconnect"));
    assert_eq!(runner.calls().last().map(String::as_str), Some("nordvpn disconnect"));

    assert_eq!(launcher.launch_count(), 2);
    assert_eq!(launcher.terminate_count(), 2);
    assert_eq!(launcher.max_concurrent(), 1);
    assert_eq!(controller.state(), RunState::Done);
}

#[tokio::test(start_paused = true)]
async fn test_priced_and_unpriced_identities() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France, Japan");
    let launcher = StubLauncher::new(priced_page("€1,234.00")).then(StubPage::new());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    assert_eq!(result.records.len(), 2);
    let france = &result.records[0];
    assert_eq!(france.identity, "France");
    assert_eq!(france.raw_price, "€1,234.00");
    assert_eq!(france.normalized_price, Some(1234.0));
    assert_eq!(france.hotel_name, "Goodview Serviced Apartment");
    assert_eq!(france.ip_address, "203.0.113.7");
    assert_eq!(france.url, HOTEL_URL);
    assert!(france.is_usable());

    let japan = &result.records[1];
    assert_eq!(japan.identity, "Japan");
    assert_eq!(japan.raw_price, NO_PRICE);
    assert_eq!(japan.normalized_price, None);
    assert_eq!(japan.hotel_name, UNKNOWN);
    assert!(!japan.is_usable());

    assert_eq!(result.succeeded, vec![identity("France")]);
    assert_eq!(result.failed, vec![identity("Japan")]);
    let stats = result.statistics.unwrap();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.min, 1234.0);
    assert_eq!(stats.max, 1234.0);
    assert_eq!(stats.spread, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_identity_list_is_rotation_unavailable() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("");
    let launcher = StubLauncher::new(StubPage::new());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await;

    assert!(matches!(result, Err(ControllerError::RotationUnavailable)));
    assert_eq!(launcher.launch_count(), 0);
    assert_eq!(runner.count("connect"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_identity_source_is_rotation_unavailable() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France").with_failing_list();
    let launcher = StubLauncher::new(StubPage::new());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    assert!(matches!(controller.run().await, Err(ControllerError::RotationUnavailable)));
}

#[tokio::test(start_paused = true)]
async fn test_session_failure_forces_deactivation_and_continues() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France, Japan");
    let launcher = StubLauncher::failing();
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    assert!(result.records.is_empty());
    assert_eq!(result.failed, vec![identity("France"), identity("Japan")]);
    assert!(result.statistics.is_none());
    // initial reset, pre-connect and forced disconnect per identity, final reset
    assert_eq!(runner.count("disconnect"), 1 + 2 * 2 + 1);
    assert_eq!(launcher.launch_count(), 2);
    for dir in launcher.storage_dirs() {
        assert!(!dir.exists());
    }
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_yields_error_record() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France");
    let page = StubPage::new().with_navigation_error("net::ERR_CONNECTION_RESET");
    let launcher = StubLauncher::new(page.clone());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.hotel_name, ERROR);
    assert!(record.raw_price.starts_with("Error: "));
    assert!(record.raw_price.contains("net::ERR_CONNECTION_RESET"));
    assert_eq!(record.screenshot, UNKNOWN);
    assert!(record.is_error());
    assert_eq!(result.failed, vec![identity("France")]);
    assert!(page.screenshots().is_empty());
    assert_eq!(launcher.terminate_count(), 1);
    assert!(!launcher.storage_dirs()[0].exists());
}

#[tokio::test(start_paused = true)]
async fn test_screenshot_is_recorded() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France");
    let page = priced_page("€99");
    let launcher = StubLauncher::new(page.clone());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    let shots = page.screenshots();
    assert_eq!(shots.len(), 1);
    assert_eq!(PathBuf::from(&result.records[0].screenshot), shots[0]);
    assert!(shots[0].starts_with(root.path().join("screenshots")));
}

#[tokio::test(start_paused = true)]
async fn test_capture_failure_keeps_record_usable() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France");
    let launcher = StubLauncher::new(priced_page("€99").with_failing_screenshot());
    let mut controller = controller(config(root.path()), &launcher, &runner);

    let result = controller.run().await.unwrap();

    assert_eq!(result.records[0].screenshot, UNKNOWN);
    assert!(result.records[0].is_usable());
    assert_eq!(result.succeeded, vec![identity("France")]);
}

#[tokio::test(start_paused = true)]
async fn test_identity_filter_and_cap() {
    let root = TempDir::new().unwrap();
    let mut cfg = config(root.path());
    cfg.run.identities = vec!["japan".into(), "Atlantis".into(), "France".into(), "JAPAN".into()];
    let runner = StubRunner::new().with_listing("France, Japan, Brazil");
    let launcher = StubLauncher::new(priced_page("€100"));
    let result = controller(cfg, &launcher, &runner).run().await.unwrap();

    let attempted: Vec<&str> = result.records.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(attempted, ["Japan", "France"]);

    let mut cfg = config(root.path());
    cfg.run.max_identities = Some(1);
    let runner = StubRunner::new().with_listing("France, Japan, Brazil");
    let launcher = StubLauncher::new(priced_page("€100"));
    let result = controller(cfg, &launcher, &runner).run().await.unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].identity, "France");
    assert_eq!(runner.count("connect"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leftover_sessions_swept_before_run() {
    let root = TempDir::new().unwrap();
    let cfg = config(root.path());
    let leftover = PathBuf::from(&cfg.session.root_dir).join("hotel_chrome_session_1700000000_deadbeef");
    std::fs::create_dir_all(leftover.join("Default")).unwrap();

    let runner = StubRunner::new().with_listing("France");
    let launcher = StubLauncher::new(priced_page("€100"));
    let mut controller = controller(cfg, &launcher, &runner);
    controller.run().await.unwrap();

    assert!(!leftover.exists());
    assert!(!controller.sessions().has_open_session());
}

fn quiet_config(root: &Path, pause_secs: u64) -> Config {
    let mut cfg = config(root);
    cfg.rotation.pre_connect_delay_secs = 0;
    cfg.rotation.stabilization_secs = 0;
    cfg.rotation.post_disconnect_delay_secs = 0;
    cfg.extraction.settle_secs = 0;
    cfg.extraction.post_load_settle_secs = 0;
    cfg.extraction.popup_timeout_secs = 0;
    cfg.run.inter_identity_delay_secs = pause_secs;
    cfg
}

async fn timed_run(cfg: Config) -> std::time::Duration {
    let runner = StubRunner::new().with_listing("France, Japan, Brazil");
    let launcher = StubLauncher::new(priced_page("€100"));
    let mut controller = controller(cfg, &launcher, &runner);

    let started = tokio::time::Instant::now();
    let result = controller.run().await.unwrap();
    assert_eq!(result.succeeded.len(), 3);
    started.elapsed()
}

#[tokio::test(start_paused = true)]
async fn test_pause_only_between_identities() {
    let root = TempDir::new().unwrap();
    let pause = std::time::Duration::from_secs(10);

    let without_pause = timed_run(quiet_config(root.path(), 0)).await;
    let with_pause = timed_run(quiet_config(root.path(), pause.as_secs())).await;

    // three identities: two pauses, none after the last one
    assert_eq!(with_pause - without_pause, pause * 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_pause_for_single_identity() {
    let root = TempDir::new().unwrap();
    let mut cfg = quiet_config(root.path(), 10);
    cfg.run.max_identities = Some(1);
    let runner = StubRunner::new().with_listing("France, Japan");
    let launcher = StubLauncher::new(priced_page("€100"));
    let mut controller = controller(cfg, &launcher, &runner);

    let started = tokio::time::Instant::now();
    controller.run().await.unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_egress_looked_up_once_per_opened_session() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new()
        .with_listing("France, Japan, Brazil")
        .with_failing_connect("Japan");
    let launcher = StubLauncher::new(priced_page("€100"));
    let lookup = StubLookup::new("198.51.100.4");
    let mut controller = Controller::new(config(root.path()), launcher.clone(), runner.clone(), lookup.clone());

    let result = controller.run().await.unwrap();

    assert_eq!(lookup.lookup_count(), 2);
    assert!(result.records.iter().all(|r| r.ip_address == "198.51.100.4"));
}

struct FullDisk;

impl ResultStorage for FullDisk {
    fn save_run(&self, _result: &RunResult) -> Result<StoredRun, StorageError> {
        Err(StorageError::WriteFailed(String::from("No space left on device")))
    }
}

#[tokio::test(start_paused = true)]
async fn test_persist_writes_run_files() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France");
    let launcher = StubLauncher::new(priced_page("€100"));
    let mut controller = controller(config(root.path()), &launcher, &runner);
    let result = controller.run().await.unwrap();

    let storage = FileStorage::new(root.path().join("hotel_prices"), "hotel_multi_country").unwrap();
    let stored = controller.persist(&storage, &result).unwrap();

    assert!(stored.csv_path.is_file());
    assert!(stored.json_path.is_file());
}

#[tokio::test(start_paused = true)]
async fn test_persist_failure_is_a_storage_error() {
    let root = TempDir::new().unwrap();
    let runner = StubRunner::new().with_listing("France");
    let launcher = StubLauncher::new(priced_page("€100"));
    let mut controller = controller(config(root.path()), &launcher, &runner);
    let result = controller.run().await.unwrap();

    match controller.persist(&FullDisk, &result) {
        Err(ControllerError::StorageError(StorageError::WriteFailed(msg))) => {
            assert!(msg.contains("No space left"));
        }
        other => panic!("expected storage error, got {:?}", other.map(|s| s.csv_path)),
    }
}
