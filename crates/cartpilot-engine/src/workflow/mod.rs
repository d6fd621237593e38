//! The food-order workflow: eight named steps run through the fail-fast
//! [`Pipeline`](crate::pipeline::Pipeline).

pub mod profile;
mod steps;

use crate::cli::OutputHandlers;
use crate::config::CartpilotConfig;
use crate::driver::Driver;
use crate::error::WorkflowError;
use crate::interaction::Interactor;
use crate::pipeline::{Pipeline, PipelineReport, Step, StepAction};
use async_trait::async_trait;
use tracing::info;

pub use profile::{NamedProbe, SiteLocators, SiteProfile};

/// Everything a step needs: the driver (through the interactor), the
/// configuration and the operator console. Built once per run.
pub struct OrderSession<'d, D: Driver + ?Sized> {
    interactor: Interactor<'d, D>,
    config: &'d CartpilotConfig,
    output: OutputHandlers,
}

impl<'d, D: Driver + ?Sized> OrderSession<'d, D> {
    pub fn new(driver: &'d D, config: &'d CartpilotConfig, output: OutputHandlers) -> Self {
        Self {
            interactor: Interactor::new(driver, config.interaction.engine_config()),
            config,
            output,
        }
    }

    pub fn driver(&self) -> &'d D {
        self.interactor.driver()
    }

    pub fn interactor(&self) -> &Interactor<'d, D> {
        &self.interactor
    }

    pub fn config(&self) -> &'d CartpilotConfig {
        self.config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStep {
    OpenHome,
    Login,
    AwaitLocation,
    OpenSearch,
    SearchRestaurant,
    SelectRestaurant,
    AddItemToCart,
    ViewCartAndSelectAddress,
}

impl OrderStep {
    pub const ALL: [OrderStep; 8] = [
        OrderStep::OpenHome,
        OrderStep::Login,
        OrderStep::AwaitLocation,
        OrderStep::OpenSearch,
        OrderStep::SearchRestaurant,
        OrderStep::SelectRestaurant,
        OrderStep::AddItemToCart,
        OrderStep::ViewCartAndSelectAddress,
    ];

    /// Step names as they appear in the log.
    pub fn name(&self) -> &'static str {
        match self {
            OrderStep::OpenHome => "Opening Swiggy",
            OrderStep::Login => "Handling login",
            OrderStep::AwaitLocation => "Waiting for location handling",
            OrderStep::OpenSearch => "Navigating to search page",
            OrderStep::SearchRestaurant => "Searching restaurant",
            OrderStep::SelectRestaurant => "Selecting restaurant",
            OrderStep::AddItemToCart => "Adding item to cart",
            OrderStep::ViewCartAndSelectAddress => "Viewing cart and selecting address",
        }
    }

    pub fn pipeline() -> Pipeline<OrderStep> {
        Pipeline::new(
            Self::ALL
                .iter()
                .map(|step| Step::new(step.name(), *step))
                .collect(),
        )
    }
}

#[async_trait]
impl<'d, D: Driver + ?Sized> StepAction<OrderSession<'d, D>> for OrderStep {
    async fn run(&self, session: &OrderSession<'d, D>) -> Result<bool, WorkflowError> {
        match self {
            OrderStep::OpenHome => session.open_home().await,
            OrderStep::Login => session.login().await,
            OrderStep::AwaitLocation => session.await_location().await,
            OrderStep::OpenSearch => session.open_search().await,
            OrderStep::SearchRestaurant => session.search_restaurant().await,
            OrderStep::SelectRestaurant => session.select_restaurant().await,
            OrderStep::AddItemToCart => session.add_item_to_cart().await,
            OrderStep::ViewCartAndSelectAddress => session.view_cart_and_select_address().await,
        }
    }
}

/// Run the whole order workflow against `driver`.
///
/// On success the cart is filled and an address chosen; payment is left to
/// the operator.
pub async fn run_order<D: Driver + ?Sized>(
    driver: &D,
    config: &CartpilotConfig,
    output: OutputHandlers,
) -> PipelineReport {
    let session = OrderSession::new(driver, config, output);
    let report = OrderStep::pipeline().run(&session).await;

    if report.succeeded() {
        info!("Automation completed successfully!");
        output.say("Automation complete! The item has been added to cart and home address selected.");
        output.say("You can now review the order and proceed with payment manually.");
    }
    report
}
