mod logging;

use anyhow::Context;
use cartpilot_e::WebDriverDriver;
use cartpilot_engine::cli::{self, OutputHandlers, PromptResult};
use cartpilot_engine::config::{CartpilotConfig, ConfigLoader};
use cartpilot_engine::driver::Driver;
use cartpilot_engine::pipeline::PipelineReport;
use cartpilot_engine::workflow::run_order;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "cartpilot",
    version,
    about = "Log in, find a restaurant and fill the cart; payment stays manual"
)]
struct Args {
    /// Phone number used for the OTP login
    #[arg(short, long)]
    phone: Option<String>,

    /// Restaurant to search for
    #[arg(short, long)]
    restaurant: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Config file (default: ./cartpilot.yaml, then ~/.cartpilot/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of an external WebDriver server. If not provided, chromedriver is launched.
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Close the browser when the program exits
    #[arg(long)]
    close_browser: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut CartpilotConfig) {
        if let Some(phone) = &self.phone {
            config.order.phone_number = phone.clone();
        }
        if let Some(restaurant) = &self.restaurant {
            config.order.restaurant = restaurant.clone();
        }
        if self.headless {
            config.driver.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            config.driver.webdriver_url = Some(url.clone());
        }
        if let Some(path) = &self.log_file {
            config.logging.file = path.clone();
        }
        if self.close_browser {
            config.driver.keep_browser_open = false;
        }
    }
}

enum RunOutcome {
    Finished(PipelineReport),
    Interrupted,
}

async fn run(
    driver: &mut WebDriverDriver,
    config: &CartpilotConfig,
    output: OutputHandlers,
) -> anyhow::Result<RunOutcome> {
    driver
        .launch()
        .await
        .context("Failed to start the browser")?;

    let session: &WebDriverDriver = driver;
    tokio::select! {
        report = run_order(session, config, output) => Ok(RunOutcome::Finished(report)),
        _ = tokio::signal::ctrl_c() => Ok(RunOutcome::Interrupted),
    }
}

async fn cleanup(driver: &mut WebDriverDriver, config: &CartpilotConfig) {
    if !driver.is_ready().await {
        return;
    }
    let result = if config.driver.keep_browser_open {
        driver.detach().await
    } else {
        info!("Closing browser...");
        driver.close().await
    };
    if let Err(e) = result {
        warn!("Cleanup failed: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    args.apply(&mut config);

    logging::init(&config.logging, args.verbose)?;
    config.validate()?;

    info!(
        "Starting cartpilot (restaurant: {}, headless: {})",
        config.order.restaurant, config.driver.headless
    );

    let output = OutputHandlers::console();
    let mut driver = WebDriverDriver::new(config.driver.clone());

    let outcome = run(&mut driver, &config, output).await;
    let result = match outcome {
        Ok(RunOutcome::Finished(report)) if report.succeeded() => {
            output.say("Automation completed successfully!");
            Ok(())
        }
        Ok(RunOutcome::Finished(report)) => {
            let step = report.failed_step.as_deref().unwrap_or("unknown step");
            output.warn(&format!("Automation failed at: {}", step));
            output.warn(&format!(
                "Check {} for details.",
                config.logging.file.display()
            ));
            Ok(())
        }
        Ok(RunOutcome::Interrupted) => {
            info!("Automation interrupted by user");
            Ok(())
        }
        Err(e) => {
            error!("Unexpected error: {:#}", e);
            Err(e)
        }
    };

    if driver.is_ready().await {
        match cli::wait_for_enter("Press Enter to close the browser...", output, true).await {
            PromptResult::Error(e) => warn!("Prompt failed: {}", e),
            PromptResult::Interrupted => info!("Interrupted at prompt"),
            PromptResult::Confirmed | PromptResult::Closed => {}
        }
    }
    cleanup(&mut driver, &config).await;

    result
}
