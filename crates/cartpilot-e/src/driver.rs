use crate::chromedriver::{self, ChromedriverProcess};
use crate::webdriver::WebDriverClient;
use async_trait::async_trait;
use cartpilot_engine::config::DriverConfig;
use cartpilot_engine::driver::{Driver, NavigationResult};
use cartpilot_engine::error::DriverError;
use cartpilot_engine::locator::{Locator, Strategy};
use fantoccini::Client;
use fantoccini::actions::{InputSource, MOUSE_BUTTON_LEFT, MouseActions, PointerAction};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use tracing::{info, warn};

/// Chrome over WebDriver, either through a chromedriver this process
/// launches or an external WebDriver server.
pub struct WebDriverDriver {
    config: DriverConfig,
    client: Option<WebDriverClient>,
    chromedriver: Option<ChromedriverProcess>,
}

impl WebDriverDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            client: None,
            chromedriver: None,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn client(&self) -> Result<&Client, DriverError> {
        self.client
            .as_ref()
            .map(|c| &c.client)
            .ok_or(DriverError::NotReady)
    }

    /// Disconnect without ending the browser session, so the window stays
    /// open for the operator.
    pub async fn detach(&mut self) -> Result<(), DriverError> {
        let result = match self.client.take() {
            Some(client) => client.detach().await,
            None => Ok(()),
        };
        if let Some(process) = self.chromedriver.take() {
            process.release();
        }
        info!("Browser left open");
        result
    }

    async fn start_chromedriver(&mut self) -> Result<String, DriverError> {
        let binary = chromedriver::find_chromedriver_binary(self.config.chromedriver_path.as_deref())
            .ok_or_else(|| {
                DriverError::Launch(
                    "chromedriver not found. Install it or set driver.chromedriver_path".to_string(),
                )
            })?;

        let process = chromedriver::launch_chromedriver(&binary, self.config.chromedriver_port)
            .await
            .map_err(DriverError::Launch)?;
        let url = process.webdriver_url();
        self.chromedriver = Some(process);
        Ok(url)
    }
}

/// Callers pass lowered locators, so `Text` never reaches the wire as such.
fn wd_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator.by {
        Strategy::Css => fantoccini::Locator::Css(&locator.query),
        Strategy::XPath | Strategy::Text => fantoccini::Locator::XPath(&locator.query),
        Strategy::Id => fantoccini::Locator::Id(&locator.query),
        Strategy::LinkText => fantoccini::Locator::LinkText(&locator.query),
    }
}

fn is_stale(e: &CmdError) -> bool {
    e.is_stale_element_reference()
}

fn find_error(locator: &Locator, e: CmdError) -> DriverError {
    if e.is_no_such_element() {
        DriverError::NotFound(locator.to_string())
    } else if is_stale(&e) {
        DriverError::StaleElement(e.to_string())
    } else {
        DriverError::Other(format!("find {} failed: {}", locator, e))
    }
}

fn element_error(action: &str, e: CmdError) -> DriverError {
    if is_stale(&e) {
        DriverError::StaleElement(e.to_string())
    } else {
        DriverError::Interaction(format!("{} failed: {}", action, e))
    }
}

#[async_trait]
impl Driver for WebDriverDriver {
    type Handle = Element;

    async fn launch(&mut self) -> Result<(), DriverError> {
        let url = match &self.config.webdriver_url {
            Some(url) => {
                info!("Connecting to external WebDriver at {}...", url);
                url.clone()
            }
            None => {
                info!(
                    "Launching chromedriver on port {}...",
                    self.config.chromedriver_port
                );
                self.start_chromedriver().await?
            }
        };

        let capabilities = chromedriver::chrome_capabilities(&self.config);
        let client = WebDriverClient::connect(&url, Some(capabilities)).await?;
        self.client = Some(client);
        info!("Chrome driver initialized (headless: {})", self.config.headless);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        // Dropping the process handle shuts chromedriver down.
        self.chromedriver = None;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, DriverError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn find_element(&self, locator: &Locator) -> Result<Element, DriverError> {
        let target = locator.lowered();
        self.client()?
            .find(wd_locator(&target))
            .await
            .map_err(|e| find_error(&target, e))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<Element>, DriverError> {
        let target = locator.lowered();
        match self.client()?.find_all(wd_locator(&target)).await {
            Ok(elements) => Ok(elements),
            Err(e) if e.is_no_such_element() => Ok(vec![]),
            Err(e) => Err(find_error(&target, e)),
        }
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool, DriverError> {
        element
            .is_displayed()
            .await
            .map_err(|e| element_error("is_displayed", e))
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool, DriverError> {
        element
            .is_enabled()
            .await
            .map_err(|e| element_error("is_enabled", e))
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map_err(|e| element_error("click", e))
    }

    async fn pointer_click(&self, element: &Element) -> Result<(), DriverError> {
        let client = self.client()?;
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveToElement {
                element: element.clone(),
                duration: None,
                x: Default::default(),
                y: Default::default(),
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            });

        client
            .perform_actions(actions)
            .await
            .map_err(|e| element_error("pointer click", e))?;
        if let Err(e) = client.release_actions().await {
            warn!("Releasing pointer actions failed: {}", e);
        }
        Ok(())
    }

    async fn execute_script(
        &self,
        script: &str,
        element: Option<&Element>,
    ) -> Result<serde_json::Value, DriverError> {
        let args = match element {
            Some(el) => vec![serde_json::to_value(el)?],
            None => vec![],
        };
        self.client()?
            .execute(script, args)
            .await
            .map_err(|e| {
                if is_stale(&e) {
                    DriverError::StaleElement(e.to_string())
                } else {
                    DriverError::Script(e.to_string())
                }
            })
    }

    async fn clear(&self, element: &Element) -> Result<(), DriverError> {
        element.clear().await.map_err(|e| element_error("clear", e))
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<(), DriverError> {
        element
            .send_keys(text)
            .await
            .map_err(|e| element_error("send_keys", e))
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.client()?
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| DriverError::Other(format!("current_url failed: {}", e)))
    }

    async fn title(&self) -> Result<String, DriverError> {
        self.client()?
            .title()
            .await
            .map_err(|e| DriverError::Other(format!("title failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_mapping() {
        let css = Locator::css("#cart");
        assert!(matches!(wd_locator(&css), fantoccini::Locator::Css("#cart")));

        let id = Locator::id("mobile");
        assert!(matches!(wd_locator(&id), fantoccini::Locator::Id("mobile")));

        let text = Locator::text("View Cart").lowered();
        assert!(matches!(wd_locator(&text), fantoccini::Locator::XPath(_)));
    }

    #[test]
    fn test_error_mapping_uses_status() {
        use fantoccini::error::{ErrorStatus, WebDriver};

        let css = Locator::css("#cart");
        let stale = CmdError::Standard(WebDriver::new(
            ErrorStatus::StaleElementReference,
            "element is not attached to the page document",
        ));
        assert!(matches!(find_error(&css, stale), DriverError::StaleElement(_)));

        let missing = CmdError::Standard(WebDriver::new(ErrorStatus::NoSuchElement, "no such element"));
        assert!(matches!(find_error(&css, missing), DriverError::NotFound(_)));

        // Message text alone does not make an error stale.
        let other = CmdError::Standard(WebDriver::new(
            ErrorStatus::InvalidSelector,
            "stale element in selector",
        ));
        assert!(matches!(find_error(&css, other), DriverError::Other(_)));
        let click = CmdError::Standard(WebDriver::new(
            ErrorStatus::ElementClickIntercepted,
            "stale element overlay",
        ));
        assert!(matches!(element_error("click", click), DriverError::Interaction(_)));
    }

    #[tokio::test]
    async fn test_not_ready_before_launch() {
        let driver = WebDriverDriver::new(DriverConfig::default());
        assert!(!driver.is_ready().await);
        assert!(matches!(
            driver.current_url().await,
            Err(DriverError::NotReady)
        ));
        assert!(matches!(
            driver.navigate("https://www.swiggy.com/").await,
            Err(DriverError::NotReady)
        ));
    }
}
