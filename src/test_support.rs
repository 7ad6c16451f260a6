//! Hand-written stand-ins for the browser, the identity-control program and the
//! egress lookup. State is shared behind `Arc<Mutex<_>>` so a test keeps a clone for
//! inspection after handing the stub to the code under test.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error_handling::types::{DocumentError, RotationError, SessionError};
use crate::extraction::{Document, PageElement};
use crate::identity_rotation::{AddressLookup, CommandOutput, CommandRunner};
use crate::session_management::{BrowserLauncher, BrowserOptions, BrowserProcess, Page};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct DocumentState {
    elements: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    clickable: HashSet<String>,
    click_fails: HashSet<String>,
    queries: HashMap<String, usize>,
    clicked: Vec<String>,
    scrolled: Vec<String>,
}

/// In-memory document keyed by selector.
#[derive(Clone, Default)]
pub struct StubDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl StubDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements matching `selector`, one per text.
    pub fn with(self, selector: &str, texts: &[&str]) -> Self {
        lock(&self.state)
            .elements
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Queries for `selector` error out.
    pub fn failing(self, selector: &str) -> Self {
        lock(&self.state).failing.insert(selector.to_string());
        self
    }

    /// `selector` becomes clickable immediately.
    pub fn clickable(self, selector: &str) -> Self {
        lock(&self.state).clickable.insert(selector.to_string());
        self
    }

    /// Clicks on `selector` fail.
    pub fn unclickable(self, selector: &str) -> Self {
        lock(&self.state).click_fails.insert(selector.to_string());
        self
    }

    /// Lookups of any kind made for `selector`.
    pub fn query_count(&self, selector: &str) -> usize {
        lock(&self.state).queries.get(selector).copied().unwrap_or(0)
    }

    pub fn clicked(&self) -> Vec<String> {
        lock(&self.state).clicked.clone()
    }

    pub fn scrolled(&self) -> Vec<String> {
        lock(&self.state).scrolled.clone()
    }

    fn record_query(&self, selector: &str) -> Result<(), DocumentError> {
        let mut state = lock(&self.state);
        *state.queries.entry(selector.to_string()).or_insert(0) += 1;
        if state.failing.contains(selector) {
            return Err(DocumentError::Query(format!("invalid selector {}", selector)));
        }
        Ok(())
    }

    fn element(&self, selector: &str, text: &str) -> StubElement {
        StubElement {
            selector: selector.to_string(),
            text: text.to_string(),
            state: Arc::clone(&self.state),
        }
    }
}

pub struct StubElement {
    selector: String,
    text: String,
    state: Arc<Mutex<DocumentState>>,
}

impl PageElement for StubElement {
    async fn text(&self) -> Result<String, DocumentError> {
        Ok(self.text.clone())
    }

    async fn click(&self) -> Result<(), DocumentError> {
        let mut state = lock(&self.state);
        if state.click_fails.contains(&self.selector) {
            return Err(DocumentError::Interaction(format!("{} is covered", self.selector)));
        }
        state.clicked.push(self.selector.clone());
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), DocumentError> {
        lock(&self.state).scrolled.push(self.selector.clone());
        Ok(())
    }
}

impl Document for StubDocument {
    type Element = StubElement;

    async fn find_element(&self, selector: &str) -> Result<Option<StubElement>, DocumentError> {
        self.record_query(selector)?;
        let first = lock(&self.state)
            .elements
            .get(selector)
            .and_then(|texts| texts.first().cloned());
        Ok(first.map(|text| self.element(selector, &text)))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<StubElement>, DocumentError> {
        self.record_query(selector)?;
        let texts = lock(&self.state).elements.get(selector).cloned().unwrap_or_default();
        Ok(texts.iter().map(|text| self.element(selector, text)).collect())
    }

    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<StubElement>, DocumentError> {
        self.record_query(selector)?;
        let clickable = lock(&self.state).clickable.contains(selector);
        if clickable {
            return Ok(Some(self.element(selector, "")));
        }
        tokio::time::sleep(timeout).await;
        Ok(None)
    }
}

#[derive(Default)]
struct PageState {
    navigation_error: Option<String>,
    screenshot_fails: bool,
    navigations: Vec<String>,
    scripts: Vec<String>,
    init_scripts: Vec<String>,
    screenshots: Vec<PathBuf>,
}

/// A page whose document is a [`StubDocument`] that always has a `body`.
#[derive(Clone)]
pub struct StubPage {
    document: StubDocument,
    state: Arc<Mutex<PageState>>,
}

impl Default for StubPage {
    fn default() -> Self {
        Self::new()
    }
}

impl StubPage {
    pub fn new() -> Self {
        Self {
            document: StubDocument::new().with("body", &[""]),
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    pub fn with_document(self, document: StubDocument) -> Self {
        Self {
            document: document.with("body", &[""]),
            state: self.state,
        }
    }

    pub fn with_navigation_error(self, message: &str) -> Self {
        lock(&self.state).navigation_error = Some(message.to_string());
        self
    }

    pub fn with_failing_screenshot(self) -> Self {
        lock(&self.state).screenshot_fails = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state).navigations.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }

    pub fn init_scripts(&self) -> Vec<String> {
        lock(&self.state).init_scripts.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        lock(&self.state).screenshots.clone()
    }
}

impl Document for StubPage {
    type Element = StubElement;

    async fn find_element(&self, selector: &str) -> Result<Option<StubElement>, DocumentError> {
        self.document.find_element(selector).await
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<StubElement>, DocumentError> {
        self.document.find_elements(selector).await
    }

    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<StubElement>, DocumentError> {
        self.document.wait_until_clickable(selector, timeout).await
    }
}

impl Page for StubPage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        state.navigations.push(url.to_string());
        match &state.navigation_error {
            Some(message) => Err(SessionError::NavigationFailed(message.clone())),
            None => Ok(()),
        }
    }

    async fn execute_script(&self, script: &str) -> Result<(), SessionError> {
        lock(&self.state).scripts.push(script.to_string());
        Ok(())
    }

    async fn add_init_script(&self, script: &str) -> Result<(), SessionError> {
        lock(&self.state).init_scripts.push(script.to_string());
        Ok(())
    }

    async fn capture_screenshot(&self, path: &Path, _full_page: bool) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        if state.screenshot_fails {
            return Err(SessionError::CaptureFailed(String::from("renderer crashed")));
        }
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct LauncherState {
    launches: usize,
    terminates: usize,
    live: usize,
    max_live: usize,
    storage_dirs: Vec<PathBuf>,
}

/// Launches [`StubProcess`]es, handing out the configured pages in order.
///
/// The last page is reused once the list runs out.
#[derive(Clone)]
pub struct StubLauncher {
    pages: Vec<StubPage>,
    fail: bool,
    fail_terminate: bool,
    launch_delay: Option<Duration>,
    state: Arc<Mutex<LauncherState>>,
}

impl StubLauncher {
    pub fn new(page: StubPage) -> Self {
        Self {
            pages: vec![page],
            fail: false,
            fail_terminate: false,
            launch_delay: None,
            state: Arc::new(Mutex::new(LauncherState::default())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(StubPage::new())
        }
    }

    /// Page for the next launch after those already configured.
    pub fn then(mut self, page: StubPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    pub fn with_failing_terminate(mut self) -> Self {
        self.fail_terminate = true;
        self
    }

    pub fn launch_count(&self) -> usize {
        lock(&self.state).launches
    }

    pub fn terminate_count(&self) -> usize {
        lock(&self.state).terminates
    }

    /// Highest number of processes alive at the same time.
    pub fn max_concurrent(&self) -> usize {
        lock(&self.state).max_live
    }

    pub fn storage_dirs(&self) -> Vec<PathBuf> {
        lock(&self.state).storage_dirs.clone()
    }
}

impl BrowserLauncher for StubLauncher {
    type Process = StubProcess;

    async fn launch(&self, storage_dir: &Path, _options: &BrowserOptions) -> Result<StubProcess, SessionError> {
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        let index = state.launches.min(self.pages.len() - 1);
        state.launches += 1;
        state.storage_dirs.push(storage_dir.to_path_buf());
        if self.fail {
            return Err(SessionError::LaunchFailed(String::from("chrome not found")));
        }
        state.live += 1;
        state.max_live = state.max_live.max(state.live);

        Ok(StubProcess {
            page: self.pages[index].clone(),
            fail_terminate: self.fail_terminate,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct StubProcess {
    page: StubPage,
    fail_terminate: bool,
    state: Arc<Mutex<LauncherState>>,
}

impl BrowserProcess for StubProcess {
    type Page = StubPage;

    fn page(&self) -> &StubPage {
        &self.page
    }

    async fn terminate(&mut self) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        state.terminates += 1;
        state.live = state.live.saturating_sub(1);
        if self.fail_terminate {
            return Err(SessionError::TerminateFailed(String::from("no such process")));
        }
        Ok(())
    }
}

#[derive(Default)]
struct RunnerState {
    listing: String,
    list_fails: bool,
    list_times_out: bool,
    failing_connect: HashSet<String>,
    hanging_connect: HashSet<String>,
    disconnect_fails: bool,
    calls: Vec<String>,
}

/// Scripted identity-control program, answering by action (first argument).
#[derive(Clone, Default)]
pub struct StubRunner {
    state: Arc<Mutex<RunnerState>>,
}

impl StubRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, listing: &str) -> Self {
        lock(&self.state).listing = listing.to_string();
        self
    }

    pub fn with_failing_list(self) -> Self {
        lock(&self.state).list_fails = true;
        self
    }

    pub fn with_list_timeout(self) -> Self {
        lock(&self.state).list_times_out = true;
        self
    }

    pub fn with_failing_connect(self, identity: &str) -> Self {
        lock(&self.state).failing_connect.insert(identity.to_string());
        self
    }

    pub fn with_hanging_connect(self, identity: &str) -> Self {
        lock(&self.state).hanging_connect.insert(identity.to_string());
        self
    }

    pub fn with_failing_disconnect(self) -> Self {
        lock(&self.state).disconnect_fails = true;
        self
    }

    /// Every invocation as `"<program> <args...>"`, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    /// Invocations whose action is `action`.
    pub fn count(&self, action: &str) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|call| call.split_whitespace().nth(1) == Some(action))
            .count()
    }
}

fn succeeded(stdout: &str) -> CommandOutput {
    CommandOutput {
        status_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        success: true,
    }
}

fn exited(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        status_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
        success: false,
    }
}

impl CommandRunner for StubRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RotationError> {
        let mut state = lock(&self.state);
        state.calls.push(format!("{} {}", program, args.join(" ")));

        let timed_out = || RotationError::Timeout {
            program: program.to_string(),
            secs: timeout.as_secs(),
        };
        let target = args.last().map(String::as_str).unwrap_or_default();

        match args.first().map(String::as_str) {
            Some("countries") if state.list_times_out => Err(timed_out()),
            Some("countries") if state.list_fails => Ok(exited(1, "daemon is not running")),
            Some("countries") => Ok(succeeded(&state.listing)),
            Some("connect") if state.hanging_connect.contains(target) => Err(timed_out()),
            Some("connect") if state.failing_connect.contains(target) => {
                Ok(exited(1, "Whoops! Connection failed."))
            }
            Some("connect") => Ok(succeeded(&format!("You are connected to {}", target))),
            Some("disconnect") if state.disconnect_fails => Ok(exited(1, "daemon is not running")),
            Some("disconnect") => Ok(succeeded("You are disconnected from NordVPN.")),
            Some("status") => Ok(succeeded("Status: Connected")),
            _ => Ok(succeeded("")),
        }
    }
}

/// Egress lookup answering a fixed address.
#[derive(Clone)]
pub struct StubLookup {
    address: String,
    lookups: Arc<Mutex<usize>>,
}

impl StubLookup {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            lookups: Arc::new(Mutex::new(0)),
        }
    }

    pub fn lookup_count(&self) -> usize {
        *lock(&self.lookups)
    }
}

impl AddressLookup for StubLookup {
    async fn current_address(&self) -> String {
        *lock(&self.lookups) += 1;
        self.address.clone()
    }
}
