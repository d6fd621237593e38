use super::schema::CartpilotConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./cartpilot.yaml
    /// 2. ~/.cartpilot/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<CartpilotConfig, ConfigError> {
        let local_config = PathBuf::from("./cartpilot.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".cartpilot").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(CartpilotConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<CartpilotConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: CartpilotConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Explicit path if given, otherwise the default search order.
    pub async fn load(path: Option<&Path>) -> Result<CartpilotConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from(p).await,
            None => Self::load_default().await,
        }
    }
}

impl CartpilotConfig {
    /// Check the values the workflow cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let phone = self.order.phone_number.trim();
        if phone.is_empty() {
            return Err(ConfigError::Invalid(
                "phone number is required (--phone or order.phone_number)".into(),
            ));
        }
        if !phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
            return Err(ConfigError::Invalid(format!(
                "phone number '{}' must contain only digits",
                phone
            )));
        }
        if self.order.restaurant.trim().is_empty() {
            return Err(ConfigError::Invalid("restaurant name is required".into()));
        }
        if self.otp.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("otp.poll_interval_secs must be > 0".into()));
        }
        for (name, value) in [
            ("site.home_url", &self.site.home_url),
            ("site.search_url", &self.site.search_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", name, value, e)))?;
        }
        for (name, set) in self.site.locator_sets() {
            if set.is_empty() {
                return Err(ConfigError::Invalid(format!("locator set '{}' is empty", name)));
            }
        }
        Ok(())
    }
}
