//! Resilient interaction engine.
//!
//! Resolution is a two-level fallback: locator level (which element) and
//! method level (how to click it). Expected failures at either level are
//! logged and turned into an [`InteractionOutcome`]; nothing here returns an
//! error for a missing or unclickable element.

use crate::driver::{Driver, ENTER_KEY, SCRIPT_CLICK, SCRIPT_SCROLL_INTO_VIEW};
use crate::error::DriverError;
use crate::locator::{Locator, LocatorSet};
use crate::poller::BoundedPoller;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// One way of performing a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMethod {
    /// Simulated user click through the driver.
    Native,
    /// `arguments[0].click()` executed in the page.
    Script,
    /// Pointer moved onto the element, then pressed and released.
    Pointer,
}

impl ClickMethod {
    /// The fixed fallback order.
    pub const CHAIN: [ClickMethod; 3] = [ClickMethod::Native, ClickMethod::Script, ClickMethod::Pointer];

    pub fn name(&self) -> &'static str {
        match self {
            ClickMethod::Native => "click",
            ClickMethod::Script => "js",
            ClickMethod::Pointer => "action",
        }
    }
}

/// What "ready" means when probing a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    Present,
    Visible,
    /// Present, visible and enabled.
    Actionable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// No locator produced a ready element within its timeout.
    NotFound,
    /// At least one element was found, but every click method failed on it.
    FoundButInteractionFailed { candidates: usize },
    Success {
        locator_index: usize,
        method: ClickMethod,
    },
}

impl InteractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InteractionOutcome::Success { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ClickOptions {
    pub timeout_per_locator: Duration,
    pub methods: Vec<ClickMethod>,
    pub scroll_into_view: bool,
    /// Log total failure at error level. Off for opportunistic clicks that
    /// are expected to miss most of the time.
    pub report_failure: bool,
}

impl ClickOptions {
    /// Full method chain, no scrolling.
    pub fn new(timeout_per_locator: Duration) -> Self {
        Self {
            timeout_per_locator,
            methods: ClickMethod::CHAIN.to_vec(),
            scroll_into_view: false,
            report_failure: true,
        }
    }

    /// Scroll the element to the viewport centre and click it by script.
    /// Used for cards and buttons inside long, lazily rendered lists.
    pub fn scripted(timeout_per_locator: Duration) -> Self {
        Self {
            timeout_per_locator,
            methods: vec![ClickMethod::Script],
            scroll_into_view: true,
            report_failure: true,
        }
    }

    /// Probe each locator exactly once and click natively.
    pub fn immediate_native() -> Self {
        Self {
            timeout_per_locator: Duration::ZERO,
            methods: vec![ClickMethod::Native],
            scroll_into_view: false,
            report_failure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionConfig {
    /// Delay between actionability probes of one locator.
    pub probe_interval: Duration,
    /// Pause after scrolling an element into view.
    pub scroll_settle: Duration,
    /// Pause between typing text and pressing Enter.
    pub type_settle: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_millis(500),
            scroll_settle: Duration::from_secs(1),
            type_settle: Duration::from_secs(2),
        }
    }
}

/// A handle together with the locator that produced it.
#[derive(Debug, Clone)]
pub struct Located<H> {
    pub handle: H,
    pub locator_index: usize,
    pub locator: Locator,
}

pub struct Interactor<'d, D: Driver + ?Sized> {
    driver: &'d D,
    config: InteractionConfig,
}

impl<'d, D: Driver + ?Sized> Interactor<'d, D> {
    pub fn new(driver: &'d D, config: InteractionConfig) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &'d D {
        self.driver
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Click the first actionable match with the full method chain.
    pub async fn resolve_and_act(
        &self,
        set: &LocatorSet,
        description: &str,
        timeout_per_locator: Duration,
    ) -> bool {
        self.click(set, description, &ClickOptions::new(timeout_per_locator))
            .await
            .is_success()
    }

    /// Resolve `set` and click the first actionable element it yields.
    pub async fn click(
        &self,
        set: &LocatorSet,
        description: &str,
        options: &ClickOptions,
    ) -> InteractionOutcome {
        let mut candidates = 0;

        for (index, locator) in set.iter().enumerate() {
            let Some(handle) = self
                .wait_for(locator, Readiness::Actionable, options.timeout_per_locator, description)
                .await
            else {
                debug!(
                    "{}: locator {} not actionable within {:?}",
                    description, locator, options.timeout_per_locator
                );
                continue;
            };
            candidates += 1;

            if options.scroll_into_view {
                match self.scroll_into_view(&handle).await {
                    Ok(()) => sleep(self.config.scroll_settle).await,
                    Err(e) => warn!("{}: scroll into view failed: {}", description, e),
                }
            }

            if let Some(method) = self.click_element(&handle, &options.methods).await {
                info!(
                    "Successfully clicked {} (locator {}: {}, method: {})",
                    description,
                    index + 1,
                    locator,
                    method.name()
                );
                return InteractionOutcome::Success {
                    locator_index: index,
                    method,
                };
            }
            warn!("{}: element found via {} but no click method worked", description, locator);
        }

        if options.report_failure {
            error!("Failed to find and click {}", description);
        } else {
            debug!("{}: nothing clickable", description);
        }
        if candidates > 0 {
            InteractionOutcome::FoundButInteractionFailed { candidates }
        } else {
            InteractionOutcome::NotFound
        }
    }

    /// Try `methods` in order on `handle`; return the first that succeeded.
    pub async fn click_element(&self, handle: &D::Handle, methods: &[ClickMethod]) -> Option<ClickMethod> {
        for method in methods {
            let result = match method {
                ClickMethod::Native => self.driver.click(handle).await,
                ClickMethod::Script => self
                    .driver
                    .execute_script(SCRIPT_CLICK, Some(handle))
                    .await
                    .map(|_| ()),
                ClickMethod::Pointer => self.driver.pointer_click(handle).await,
            };
            match result {
                Ok(()) => return Some(*method),
                Err(e) => warn!("Click method '{}' failed: {}", method.name(), e),
            }
        }
        None
    }

    /// Sequential resolution: wait up to `timeout_per_locator` on each locator
    /// in turn and return the first ready element.
    pub async fn locate(
        &self,
        set: &LocatorSet,
        description: &str,
        timeout_per_locator: Duration,
        readiness: Readiness,
    ) -> Option<Located<D::Handle>> {
        for (index, locator) in set.iter().enumerate() {
            if let Some(handle) = self
                .wait_for(locator, readiness, timeout_per_locator, description)
                .await
            {
                debug!("Located {} via {}", description, locator);
                return Some(Located {
                    handle,
                    locator_index: index,
                    locator: locator.clone(),
                });
            }
        }
        debug!("{} not found", description);
        None
    }

    /// Sweeping resolution: each poll iteration probes every locator once,
    /// without waiting on any single one.
    pub async fn locate_any(
        &self,
        set: &LocatorSet,
        description: &str,
        poller: &BoundedPoller,
        readiness: Readiness,
    ) -> Option<Located<D::Handle>> {
        let this = self;
        let outcome = poller
            .poll_for(description, move || async move {
                for (index, locator) in set.iter().enumerate() {
                    match this.probe(locator, readiness).await {
                        Ok(Some(handle)) => {
                            return Ok(Some(Located {
                                handle,
                                locator_index: index,
                                locator: locator.clone(),
                            }));
                        }
                        Ok(None) => {}
                        Err(e) => debug!("{}: probe of {} failed: {}", description, locator, e),
                    }
                }
                Ok::<_, DriverError>(None)
            })
            .await;

        if outcome.value.is_none() {
            debug!("{} not found", description);
        }
        outcome.value
    }

    /// Clear the element, type `text`, and optionally press Enter.
    pub async fn fill(&self, handle: &D::Handle, text: &str, submit: bool) -> Result<(), DriverError> {
        self.driver.clear(handle).await?;
        self.driver.send_keys(handle, text).await?;
        if submit {
            sleep(self.config.type_settle).await;
            self.driver.send_keys(handle, ENTER_KEY).await?;
        }
        Ok(())
    }

    pub async fn scroll_into_view(&self, handle: &D::Handle) -> Result<(), DriverError> {
        self.driver
            .execute_script(SCRIPT_SCROLL_INTO_VIEW, Some(handle))
            .await
            .map(|_| ())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        readiness: Readiness,
        timeout: Duration,
        description: &str,
    ) -> Option<D::Handle> {
        let label = format!("{} [{}]", description, locator);
        let poller = BoundedPoller::new(timeout, self.config.probe_interval);
        let this = self;
        let outcome = poller
            .poll_for(&label, move || async move {
                match this.probe(locator, readiness).await {
                    Ok(Some(handle)) => Ok(Some(Ok(handle))),
                    Ok(None) => Ok(None),
                    Err(e) if e.is_transient() => Ok(None),
                    // Anything else ends the wait on this locator.
                    Err(e) => Ok::<_, DriverError>(Some(Err(e))),
                }
            })
            .await;

        match outcome.value? {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("{}: locator failed: {}", label, e);
                None
            }
        }
    }

    /// Single probe: `Ok(None)` while the element is missing or not ready.
    async fn probe(
        &self,
        locator: &Locator,
        readiness: Readiness,
    ) -> Result<Option<D::Handle>, DriverError> {
        let handle = match self.driver.find_element(&locator.lowered()).await {
            Ok(handle) => handle,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        if readiness >= Readiness::Visible && !self.driver.is_displayed(&handle).await? {
            return Ok(None);
        }
        if readiness >= Readiness::Actionable && !self.driver.is_enabled(&handle).await? {
            return Ok(None);
        }
        Ok(Some(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order() {
        assert_eq!(
            ClickMethod::CHAIN,
            [ClickMethod::Native, ClickMethod::Script, ClickMethod::Pointer]
        );
    }

    #[test]
    fn test_readiness_ordering() {
        assert!(Readiness::Actionable > Readiness::Visible);
        assert!(Readiness::Visible > Readiness::Present);
    }

    #[test]
    fn test_click_options_presets() {
        let scripted = ClickOptions::scripted(Duration::from_secs(15));
        assert_eq!(scripted.methods, vec![ClickMethod::Script]);
        assert!(scripted.scroll_into_view);

        let now = ClickOptions::immediate_native();
        assert_eq!(now.timeout_per_locator, Duration::ZERO);
        assert_eq!(now.methods, vec![ClickMethod::Native]);
        assert!(!now.report_failure);
    }
}
