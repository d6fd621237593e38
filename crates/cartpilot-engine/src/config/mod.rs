pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    CartpilotConfig, DriverConfig, InteractionSettings, LoggingConfig, OrderConfig, OtpConfig,
    TimingConfig, secs,
};
