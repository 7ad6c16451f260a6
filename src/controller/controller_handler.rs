use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Duration;

use super::run_state::RunState;
use super::scrape::PageScraper;
use crate::aggregation::{ResultAggregator, RunResult};
use crate::configuration::Config;
use crate::error_handling::types::ControllerError;
use crate::extraction::{ExtractionRecord, HotelFields};
use crate::identity_rotation::{AddressLookup, CommandRunner, Identity, IdentityRotator};
use crate::session_management::{BrowserLauncher, SessionManager};
use crate::storage::{ResultStorage, StoredRun};

/// Drives one run: every identity in turn, one session at a time.
///
/// Per identity the controller activates the identity, opens a session, scrapes,
/// captures, closes the session and commits the record. Only an empty identity list
/// aborts the run; every other failure is absorbed and recorded.
pub struct Controller<L: BrowserLauncher, R: CommandRunner, A: AddressLookup> {
    config: Config,
    rotator: IdentityRotator<R, A>,
    sessions: SessionManager<L>,
    scraper: PageScraper,
    state: RunState,
}

impl<L, R, A> Controller<L, R, A>
where
    L: BrowserLauncher,
    R: CommandRunner,
    A: AddressLookup,
{
    pub fn new(config: Config, launcher: L, runner: R, lookup: A) -> Self {
        info!("Creating controller for {}", config.target_url());
        let rotator = IdentityRotator::new(runner, lookup, config.rotation.clone());
        let sessions = SessionManager::new(launcher, &config.session);
        let scraper = PageScraper::new(&config);
        Self {
            config,
            rotator,
            sessions,
            scraper,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn sessions(&self) -> &SessionManager<L> {
        &self.sessions
    }

    /// Hands a finished run to `storage`.
    pub fn persist<S: ResultStorage>(&self, storage: &S, result: &RunResult) -> Result<StoredRun, ControllerError> {
        let stored = storage.save_run(result).map_err(|e| {
            error!("Persisting {} records failed: {}", result.records.len(), e);
            e
        })?;
        info!("Persisted {} records", result.records.len());
        Ok(stored)
    }

    /// Processes every selected identity and returns the aggregated result.
    ///
    /// Fails only with [`ControllerError::RotationUnavailable`].
    pub async fn run(&mut self) -> Result<RunResult, ControllerError> {
        let swept = self.sessions.sweep_stale_sessions();
        if swept > 0 {
            info!("Removed {} leftover session directories", swept);
        }

        let available = self.rotator.list_identities().await;
        if available.is_empty() {
            error!("No identities available, aborting run");
            return Err(ControllerError::RotationUnavailable);
        }

        let queue = self.select_identities(available);
        let names: Vec<&str> = queue.iter().map(Identity::as_str).collect();
        info!("Processing {} identities: {}", queue.len(), names.join(", "));

        let mut aggregator = ResultAggregator::new();
        self.rotator.deactivate().await;

        let total = queue.len();
        for (index, identity) in queue.iter().enumerate() {
            self.transition(RunState::RotatingIdentity);
            info!("Processing identity {}/{}: {}", index + 1, total, identity);

            if !self.rotator.activate(identity).await {
                error!("Failed to activate {}, skipping", identity);
                aggregator.add_failure(identity);
                self.transition(RunState::RecordFailed);
                continue;
            }

            let Some(record) = self.process_identity(identity).await else {
                self.rotator.deactivate().await;
                aggregator.add_failure(identity);
                self.transition(RunState::RecordFailed);
                continue;
            };

            if aggregator.add(identity, record) {
                info!("Success for {}", identity);
                self.transition(RunState::RecordCommitted);
            } else {
                warn!("No usable price for {}", identity);
                self.transition(RunState::RecordFailed);
            }

            if index + 1 < total {
                let pause = self.config.run.inter_identity_delay_secs;
                debug!("Pausing {}s before the next identity", pause);
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
        }

        self.transition(RunState::Done);
        self.rotator.deactivate().await;

        let result = aggregator.finalize();
        info!(
            "Run finished: {} succeeded, {} failed, {} records",
            result.succeeded.len(),
            result.failed.len(),
            result.records.len()
        );
        Ok(result)
    }

    /// One identity's session: open, scrape, capture, close.
    ///
    /// `None` means no session could be opened. Once a session is open a record is
    /// always produced and the session is always closed first.
    async fn process_identity(&mut self, identity: &Identity) -> Option<ExtractionRecord> {
        let session = match self.sessions.open(identity).await {
            Ok(session) => session,
            Err(e) => {
                error!("Could not open a session for {}: {}", identity, e);
                return None;
            }
        };
        self.transition(RunState::SessionOpen);

        let address = self.rotator.current_address().await;
        info!("Egress address for {}: {}", identity, address);

        self.transition(RunState::Extracting);
        let page = session.page();
        let (fields, screenshot) = match self.scraper.extract(page).await {
            Ok(fields) => {
                self.transition(RunState::Capturing);
                let screenshot = self.scraper.capture(page, identity).await;
                (fields, screenshot)
            }
            Err(e) => {
                error!("Error scraping hotel for {}: {}", identity, e);
                (HotelFields::errored(&e.to_string()), None)
            }
        };

        self.transition(RunState::SessionClosing);
        self.sessions.close(session).await;

        Some(ExtractionRecord::new(
            identity.as_str(),
            self.scraper.url(),
            &address,
            screenshot,
            fields,
        ))
    }

    /// Applies the configured identity filter (order and membership) and cap.
    fn select_identities(&self, available: Vec<Identity>) -> Vec<Identity> {
        let requested = &self.config.run.identities;
        let mut selected: Vec<Identity> = if requested.is_empty() {
            available
        } else {
            let mut seen = HashSet::new();
            requested
                .iter()
                .filter_map(|name| {
                    let found = available
                        .iter()
                        .find(|id| id.as_str().eq_ignore_ascii_case(name.trim()))
                        .cloned();
                    if found.is_none() {
                        warn!("Requested identity {} is not offered by the identity source", name);
                    }
                    found
                })
                .filter(|id| seen.insert(id.as_str().to_lowercase()))
                .collect()
        };

        if let Some(max) = self.config.run.max_identities {
            if selected.len() > max {
                info!("Limiting run to the first {} of {} identities", max, selected.len());
                selected.truncate(max);
            }
        }
        selected
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {} -> {}", self.state, next);
        self.state = next;
    }
}
