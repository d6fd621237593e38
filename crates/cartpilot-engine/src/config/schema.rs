use crate::interaction::InteractionConfig;
use crate::workflow::profile::SiteProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartpilotConfig {
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub site: SiteProfile,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to order, and as whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default = "default_restaurant")]
    pub restaurant: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            phone_number: String::new(),
            restaurant: default_restaurant(),
        }
    }
}

fn default_restaurant() -> String {
    "Chandrika Grand".to_string()
}

/// Fixed yield budgets, in seconds.
///
/// These stand in for page-state signals the site does not expose, or hand
/// time to the human; none of them is a predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub page_settle_secs: u64,
    pub after_login_click_secs: u64,
    pub after_phone_entry_secs: u64,
    pub after_continue_secs: u64,
    pub post_login_settle_secs: u64,
    pub location_wait_secs: u64,
    pub search_page_settle_secs: u64,
    pub search_input_wait_secs: u64,
    pub search_results_settle_secs: u64,
    pub restaurant_results_wait_secs: u64,
    pub restaurant_page_settle_secs: u64,
    pub menu_load_secs: u64,
    pub after_add_item_secs: u64,
    pub cart_settle_secs: u64,
    pub address_section_settle_secs: u64,
    pub after_address_select_secs: u64,
    pub manual_address_wait_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_settle_secs: 3,
            after_login_click_secs: 3,
            after_phone_entry_secs: 2,
            after_continue_secs: 3,
            post_login_settle_secs: 5,
            location_wait_secs: 60,
            search_page_settle_secs: 5,
            search_input_wait_secs: 10,
            search_results_settle_secs: 5,
            restaurant_results_wait_secs: 5,
            restaurant_page_settle_secs: 5,
            menu_load_secs: 5,
            after_add_item_secs: 3,
            cart_settle_secs: 5,
            address_section_settle_secs: 3,
            after_address_select_secs: 3,
            manual_address_wait_secs: 30,
        }
    }
}

impl TimingConfig {
    /// All budgets zero. Useful for dry runs against a fake page.
    pub fn zero() -> Self {
        Self {
            page_settle_secs: 0,
            after_login_click_secs: 0,
            after_phone_entry_secs: 0,
            after_continue_secs: 0,
            post_login_settle_secs: 0,
            location_wait_secs: 0,
            search_page_settle_secs: 0,
            search_input_wait_secs: 0,
            search_results_settle_secs: 0,
            restaurant_results_wait_secs: 0,
            restaurant_page_settle_secs: 0,
            menu_load_secs: 0,
            after_add_item_secs: 0,
            cart_settle_secs: 0,
            address_section_settle_secs: 0,
            after_address_select_secs: 0,
            manual_address_wait_secs: 0,
        }
    }
}

pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Per-locator wait for click targets.
    pub locator_timeout_secs: u64,
    /// Per-locator wait for inputs, cards and other slow elements.
    pub element_wait_secs: u64,
    pub probe_interval_ms: u64,
    pub scroll_settle_ms: u64,
    pub type_settle_ms: u64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            locator_timeout_secs: 10,
            element_wait_secs: 15,
            probe_interval_ms: 500,
            scroll_settle_ms: 1000,
            type_settle_ms: 2000,
        }
    }
}

impl InteractionSettings {
    pub fn engine_config(&self) -> InteractionConfig {
        InteractionConfig {
            probe_interval: Duration::from_millis(self.probe_interval_ms),
            scroll_settle: Duration::from_millis(self.scroll_settle_ms),
            type_settle: Duration::from_millis(self.type_settle_ms),
        }
    }
}

/// The human-in-the-loop one-time-code wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    pub max_wait_secs: u64,
    pub poll_interval_secs: u64,
    /// Report the remaining budget every N polls.
    pub progress_every: usize,
    /// Pause after clicking the verify control before re-reading the URL.
    pub verify_settle_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: 120,
            poll_interval_secs: 1,
            progress_every: 10,
            verify_settle_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub headless: bool,
    /// Connect to this WebDriver server instead of launching chromedriver.
    pub webdriver_url: Option<String>,
    pub chromedriver_path: Option<PathBuf>,
    pub chromedriver_port: u16,
    /// Leave the browser running after the process exits so the order can be
    /// finished by hand.
    pub keep_browser_open: bool,
    pub user_agent: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: false,
            webdriver_url: None,
            chromedriver_path: None,
            chromedriver_port: 9515,
            keep_browser_open: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("cartpilot.log"),
            level: "info".to_string(),
        }
    }
}
