use crate::error::DriverError;
use crate::locator::Locator;
use async_trait::async_trait;

/// W3C WebDriver code point for the Enter key.
pub const ENTER_KEY: &str = "\u{E007}";

pub const SCRIPT_CLICK: &str = "arguments[0].click();";
pub const SCRIPT_SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// The browser-control capabilities the interaction engine consumes.
///
/// Everything but `launch`/`close` takes `&self`: a session is driven by one
/// logical actor at a time, and shared borrows let poll predicates capture the
/// driver without fighting the borrow checker.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Live reference to a found node. Valid for one interaction attempt.
    type Handle: Clone + Send + Sync;

    /// Start the browser session (spawn driver, connect, etc.)
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// End the session and release resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    async fn is_ready(&self) -> bool;

    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError>;

    /// Find the first element matching `locator`, or `DriverError::NotFound`.
    async fn find_element(&self, locator: &Locator) -> Result<Self::Handle, DriverError>;

    /// Find all elements matching `locator`; an empty list is not an error.
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<Self::Handle>, DriverError>;

    async fn is_displayed(&self, element: &Self::Handle) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &Self::Handle) -> Result<bool, DriverError>;

    /// Native (simulated user) click.
    async fn click(&self, element: &Self::Handle) -> Result<(), DriverError>;

    /// Move the pointer onto the element and press/release the primary button.
    async fn pointer_click(&self, element: &Self::Handle) -> Result<(), DriverError>;

    /// Run `script` in the page. When given, `element` is `arguments[0]`.
    async fn execute_script(
        &self,
        script: &str,
        element: Option<&Self::Handle>,
    ) -> Result<serde_json::Value, DriverError>;

    async fn clear(&self, element: &Self::Handle) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &Self::Handle, text: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn title(&self) -> Result<String, DriverError>;
}
