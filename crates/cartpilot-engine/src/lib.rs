pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod interaction;
pub mod locator;
pub mod pipeline;
pub mod poller;
pub mod workflow;

pub use config::{CartpilotConfig, ConfigLoader};
pub use driver::{Driver, NavigationResult};
pub use error::{DriverError, WorkflowError};
pub use interaction::{ClickMethod, ClickOptions, InteractionOutcome, Interactor, Readiness};
pub use locator::{Locator, LocatorSet, Strategy};
pub use pipeline::{Pipeline, PipelineReport, PipelineState, Step, StepAction};
pub use poller::{BoundedPoller, PollOutcome, poll_until};
pub use workflow::{OrderSession, OrderStep, run_order};
