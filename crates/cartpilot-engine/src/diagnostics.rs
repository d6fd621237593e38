//! One-shot page state dump for post-mortem reading of the log.

use crate::driver::Driver;
use crate::workflow::profile::NamedProbe;
use tracing::{info, warn};

/// Visibility summary of one element matched by a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementState {
    Visible { enabled: bool },
    Hidden,
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub name: String,
    pub elements: Vec<ElementState>,
}

/// Log URL, title and every element each probe matches.
///
/// Nothing here is allowed to fail the caller: driver errors are logged and
/// the affected probe is skipped.
pub async fn log_page_state<D: Driver + ?Sized>(driver: &D, probes: &[NamedProbe]) -> Vec<ProbeReport> {
    match driver.current_url().await {
        Ok(url) => info!("Current URL: {}", url),
        Err(e) => warn!("Could not read current URL: {}", e),
    }
    match driver.title().await {
        Ok(title) => info!("Page Title: {}", title),
        Err(e) => warn!("Could not read page title: {}", e),
    }

    let mut reports = Vec::new();
    for probe in probes {
        let handles = match driver.find_elements(&probe.locator.lowered()).await {
            Ok(handles) => handles,
            Err(e) => {
                warn!("Error checking {}: {}", probe.name, e);
                continue;
            }
        };
        if handles.is_empty() {
            continue;
        }

        info!("Found {} {} element(s)", handles.len(), probe.name);
        let mut elements = Vec::with_capacity(handles.len());
        for (i, handle) in handles.iter().enumerate() {
            let state = match driver.is_displayed(handle).await {
                Ok(true) => ElementState::Visible {
                    enabled: driver.is_enabled(handle).await.unwrap_or(false),
                },
                Ok(false) => ElementState::Hidden,
                Err(e) => {
                    warn!("  {} {}: unreadable: {}", probe.name, i + 1, e);
                    continue;
                }
            };
            match &state {
                ElementState::Visible { enabled } => {
                    info!("  {} {}: visible, enabled={}", probe.name, i + 1, enabled)
                }
                ElementState::Hidden => info!("  {} {}: hidden", probe.name, i + 1),
            }
            elements.push(state);
        }
        reports.push(ProbeReport {
            name: probe.name.clone(),
            elements,
        });
    }
    reports
}
