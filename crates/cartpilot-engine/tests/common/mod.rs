#![allow(dead_code)]

use async_trait::async_trait;
use cartpilot_engine::driver::{Driver, NavigationResult, SCRIPT_CLICK};
use cartpilot_engine::error::DriverError;
use cartpilot_engine::interaction::ClickMethod;
use cartpilot_engine::locator::{Locator, LocatorSet};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

// =============================================================================
// Mock Driver
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    pub query: String,
}

/// How a matched element behaves once found.
#[derive(Debug, Clone)]
pub struct ElementBehavior {
    pub displayed: bool,
    pub enabled: bool,
    pub failing: Vec<ClickMethod>,
}

impl Default for ElementBehavior {
    fn default() -> Self {
        Self {
            displayed: true,
            enabled: true,
            failing: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub url: String,
    pub launched: bool,
    pub closed: bool,
    /// Every query passed to `find_element`, in order.
    pub probes: Vec<String>,
    pub clicks: Vec<(String, ClickMethod)>,
    pub scripts: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub navigations: Vec<String>,
    pub url_reads: usize,
    url_queue: VecDeque<String>,
}

/// A page where every query matches unless told otherwise.
#[derive(Debug, Default)]
pub struct MockDriver {
    pub state: Arc<Mutex<MockState>>,
    missing: HashSet<String>,
    broken: HashSet<String>,
    behaviors: HashMap<String, ElementBehavior>,
    appears_after: HashMap<String, usize>,
    stuck_url: Option<String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing.extend(queries.into_iter().map(Into::into));
        self
    }

    /// Queries the driver rejects outright, like an invalid selector.
    pub fn broken(mut self, query: &str) -> Self {
        self.broken.insert(query.to_string());
        self
    }

    /// Mark every locator of `set` as absent from the page.
    pub fn missing_set(self, set: &LocatorSet) -> Self {
        let queries: Vec<String> = set.iter().map(|l| l.lowered().query).collect();
        self.missing(queries)
    }

    pub fn behavior(mut self, query: &str, behavior: ElementBehavior) -> Self {
        self.behaviors.insert(query.to_string(), behavior);
        self
    }

    pub fn failing(self, query: &str, methods: &[ClickMethod]) -> Self {
        self.behavior(
            query,
            ElementBehavior {
                failing: methods.to_vec(),
                ..Default::default()
            },
        )
    }

    pub fn hidden(self, query: &str) -> Self {
        self.behavior(
            query,
            ElementBehavior {
                displayed: false,
                ..Default::default()
            },
        )
    }

    /// The element only exists from probe `n + 1` onwards.
    pub fn appears_after(mut self, query: &str, probes: usize) -> Self {
        self.appears_after.insert(query.to_string(), probes);
        self
    }

    /// Answer the next `current_url` reads from `urls` before falling back
    /// to the navigated URL.
    pub fn url_sequence<I, S>(self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .unwrap()
            .url_queue
            .extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn stuck_url(mut self, url: &str) -> Self {
        self.stuck_url = Some(url.to_string());
        self
    }

    pub fn probes(&self) -> Vec<String> {
        self.state.lock().unwrap().probes.clone()
    }

    pub fn clicks(&self) -> Vec<(String, ClickMethod)> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn url_reads(&self) -> usize {
        self.state.lock().unwrap().url_reads
    }

    fn behavior_of(&self, query: &str) -> ElementBehavior {
        self.behaviors.get(query).cloned().unwrap_or_default()
    }

    fn exists(&self, state: &MockState, query: &str) -> bool {
        if self.missing.contains(query) {
            return false;
        }
        match self.appears_after.get(query) {
            Some(n) => state.probes.iter().filter(|q| q.as_str() == query).count() > *n,
            None => true,
        }
    }

    fn fails(&self, handle: &MockHandle, method: ClickMethod) -> bool {
        self.behavior_of(&handle.query).failing.contains(&method)
    }

    fn record_click(&self, handle: &MockHandle, method: ClickMethod) {
        self.state
            .lock()
            .unwrap()
            .clicks
            .push((handle.query.clone(), method));
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Handle = MockHandle;

    async fn launch(&mut self) -> Result<(), DriverError> {
        self.state.lock().unwrap().launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.state.lock().unwrap().launched
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.navigations.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Mock Page".to_string(),
        })
    }

    async fn find_element(&self, locator: &Locator) -> Result<MockHandle, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.probes.push(locator.query.clone());
        if self.broken.contains(&locator.query) {
            return Err(DriverError::Other(format!("invalid selector: {}", locator.query)));
        }
        if self.exists(&state, &locator.query) {
            Ok(MockHandle {
                query: locator.query.clone(),
            })
        } else {
            Err(DriverError::NotFound(locator.to_string()))
        }
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<MockHandle>, DriverError> {
        let state = self.state.lock().unwrap();
        if self.broken.contains(&locator.query) {
            return Err(DriverError::Other(format!("invalid selector: {}", locator.query)));
        }
        if self.exists(&state, &locator.query) {
            Ok(vec![MockHandle {
                query: locator.query.clone(),
            }])
        } else {
            Ok(vec![])
        }
    }

    async fn is_displayed(&self, element: &MockHandle) -> Result<bool, DriverError> {
        Ok(self.behavior_of(&element.query).displayed)
    }

    async fn is_enabled(&self, element: &MockHandle) -> Result<bool, DriverError> {
        Ok(self.behavior_of(&element.query).enabled)
    }

    async fn click(&self, element: &MockHandle) -> Result<(), DriverError> {
        if self.fails(element, ClickMethod::Native) {
            return Err(DriverError::Interaction("element click intercepted".into()));
        }
        self.record_click(element, ClickMethod::Native);
        Ok(())
    }

    async fn pointer_click(&self, element: &MockHandle) -> Result<(), DriverError> {
        if self.fails(element, ClickMethod::Pointer) {
            return Err(DriverError::Interaction("move target out of bounds".into()));
        }
        self.record_click(element, ClickMethod::Pointer);
        Ok(())
    }

    async fn execute_script(
        &self,
        script: &str,
        element: Option<&MockHandle>,
    ) -> Result<serde_json::Value, DriverError> {
        self.state.lock().unwrap().scripts.push(script.to_string());
        if let Some(element) = element
            && script == SCRIPT_CLICK
        {
            if self.fails(element, ClickMethod::Script) {
                return Err(DriverError::Script("javascript error".into()));
            }
            self.record_click(element, ClickMethod::Script);
        }
        Ok(serde_json::Value::Null)
    }

    async fn clear(&self, _element: &MockHandle) -> Result<(), DriverError> {
        Ok(())
    }

    async fn send_keys(&self, element: &MockHandle, text: &str) -> Result<(), DriverError> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((element.query.clone(), text.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.url_reads += 1;
        if let Some(url) = &self.stuck_url {
            return Ok(url.clone());
        }
        if let Some(url) = state.url_queue.pop_front() {
            return Ok(url);
        }
        Ok(state.url.clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok("Mock Page".to_string())
    }
}

// =============================================================================
// Log capture
// =============================================================================

/// Collects formatted log lines for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
