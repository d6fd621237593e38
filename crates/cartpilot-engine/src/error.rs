use thiserror::Error;

/// Errors raised by a [`Driver`](crate::driver::Driver) implementation.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("Driver not ready (call launch first)")]
    NotReady,

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Launch failed: {0}")]
    Launch(String),

    #[error("{0}")]
    Other(String),
}

impl DriverError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NotFound(_))
    }

    /// Errors that may clear up on the next probe of the same locator.
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::NotFound(_) | DriverError::StaleElement(_))
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(e: serde_json::Error) -> Self {
        DriverError::Other(format!("Serialization error: {}", e))
    }
}

/// Unexpected failures while running a workflow step.
///
/// Expected conditions (element missing, click intercepted, wait timed out)
/// never reach this type; they are reported as `false` by the step.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
