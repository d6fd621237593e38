use cartpilot_engine::error::DriverError;
use fantoccini::{Client, ClientBuilder};
use tracing::info;

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Self, DriverError> {
        let caps = capabilities.unwrap_or_default();

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(url)
            .await
            .map_err(|e| {
                DriverError::Launch(format!("Failed to connect to WebDriver at {}: {}", url, e))
            })?;

        info!("WebDriver session started at {}", url);
        Ok(Self { client })
    }

    /// End the session; the browser window closes with it.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client
            .close()
            .await
            .map_err(|e| DriverError::Other(format!("Failed to close session: {}", e)))
    }

    /// Drop the connection but leave the session (and its window) alive.
    pub async fn detach(self) -> Result<(), DriverError> {
        self.client
            .persist()
            .await
            .map_err(|e| DriverError::Other(format!("Failed to persist session: {}", e)))
    }
}
