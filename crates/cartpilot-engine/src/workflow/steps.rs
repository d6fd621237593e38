use super::OrderSession;
use crate::config::secs;
use crate::diagnostics;
use crate::driver::Driver;
use crate::error::{DriverError, WorkflowError};
use crate::interaction::{ClickOptions, Readiness};
use crate::poller::BoundedPoller;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

type StepResult = Result<bool, WorkflowError>;

impl<'d, D: Driver + ?Sized> OrderSession<'d, D> {
    fn locator_timeout(&self) -> Duration {
        secs(self.config.interaction.locator_timeout_secs)
    }

    fn element_wait(&self) -> Duration {
        secs(self.config.interaction.element_wait_secs)
    }

    pub(super) async fn open_home(&self) -> StepResult {
        let url = &self.config.site.home_url;
        if let Err(e) = self.driver().navigate(url).await {
            error!("Failed to open {}: {}", url, e);
            return Ok(false);
        }
        info!("Opened homepage {}", url);
        sleep(secs(self.config.timing.page_settle_secs)).await;
        Ok(true)
    }

    pub(super) async fn login(&self) -> StepResult {
        let locators = &self.config.site.locators;
        let timing = &self.config.timing;

        if !self
            .interactor
            .resolve_and_act(&locators.login_button, "login button", self.locator_timeout())
            .await
        {
            error!("Could not find login button");
            return Ok(false);
        }
        sleep(secs(timing.after_login_click_secs)).await;

        let Some(phone_input) = self
            .interactor
            .locate(
                &locators.phone_input,
                "phone input field",
                self.element_wait(),
                Readiness::Visible,
            )
            .await
        else {
            error!("Phone input field not found");
            return Ok(false);
        };

        let phone = self.config.order.phone_number.trim();
        if let Err(e) = self.interactor.fill(&phone_input.handle, phone, false).await {
            error!("Failed to enter phone number: {}", e);
            return Ok(false);
        }
        info!("Entered phone number: {}", mask_phone(phone));
        sleep(secs(timing.after_phone_entry_secs)).await;

        if !self
            .interactor
            .resolve_and_act(
                &locators.continue_after_phone,
                "login after phone",
                self.locator_timeout(),
            )
            .await
        {
            error!("Could not find login/continue button after phone entry");
            return Ok(false);
        }
        sleep(secs(timing.after_continue_secs)).await;

        info!("=== Page state before OTP ===");
        diagnostics::log_page_state(self.driver(), &self.config.site.diagnostics).await;

        self.output.say("Please enter the OTP manually in the browser...");
        self.output.say("Waiting for OTP entry and automatic verification...");

        if !self.wait_for_otp().await {
            error!("OTP verification timed out or failed");
            return Ok(false);
        }

        sleep(secs(timing.post_login_settle_secs)).await;
        info!("Login process completed successfully");
        Ok(true)
    }

    /// Human-in-the-loop wait for the one-time code.
    ///
    /// Each poll observes the URL and, failing that, nudges the verify control
    /// if it has become clickable.
    async fn wait_for_otp(&self) -> bool {
        let otp = &self.config.otp;
        let poller = BoundedPoller::new(secs(otp.max_wait_secs), secs(otp.poll_interval_secs))
            .progress_every(otp.progress_every);
        let this = self;
        poller
            .poll_until("OTP verification", move || this.check_otp())
            .await
    }

    async fn check_otp(&self) -> Result<bool, DriverError> {
        let site = &self.config.site;
        let url = self.driver().current_url().await?;
        if site.is_logged_in_url(&url) {
            info!("Login detected - OTP was successful");
            return Ok(true);
        }

        let nudge = self
            .interactor
            .click(
                &site.locators.verify_button,
                "verify button",
                &ClickOptions::immediate_native(),
            )
            .await;
        if !nudge.is_success() {
            return Ok(false);
        }

        info!("Clicked verify button");
        sleep(secs(self.config.otp.verify_settle_secs)).await;
        let url = self.driver().current_url().await?;
        Ok(site.is_logged_in_url(&url))
    }

    pub(super) async fn await_location(&self) -> StepResult {
        let wait = self.config.timing.location_wait_secs;
        self.output
            .say("Please handle location/address selection manually if prompted...");
        self.output.say(&format!(
            "Waiting for you to complete location setup ({} seconds)...",
            wait
        ));
        sleep(secs(wait)).await;
        info!("Location handling wait completed");
        Ok(true)
    }

    pub(super) async fn open_search(&self) -> StepResult {
        let url = &self.config.site.search_url;
        if let Err(e) = self.driver().navigate(url).await {
            error!("Failed to navigate to search page: {}", e);
            return Ok(false);
        }
        info!("Navigated to search page: {}", url);
        sleep(secs(self.config.timing.search_page_settle_secs)).await;
        Ok(true)
    }

    pub(super) async fn search_restaurant(&self) -> StepResult {
        let restaurant = &self.config.order.restaurant;
        let poller = BoundedPoller::with_budget(secs(self.config.timing.search_input_wait_secs));

        let Some(input) = self
            .interactor
            .locate_any(
                &self.config.site.locators.search_input,
                "search input",
                &poller,
                Readiness::Actionable,
            )
            .await
        else {
            error!("Search input not found");
            return Ok(false);
        };

        if let Err(e) = self.interactor.fill(&input.handle, restaurant, true).await {
            error!("Failed to search for restaurant: {}", e);
            return Ok(false);
        }
        info!("Searched for restaurant: {}", restaurant);
        sleep(secs(self.config.timing.search_results_settle_secs)).await;
        Ok(true)
    }

    pub(super) async fn select_restaurant(&self) -> StepResult {
        let restaurant = &self.config.order.restaurant;
        let set = self.config.site.restaurant_locators(restaurant);

        sleep(secs(self.config.timing.restaurant_results_wait_secs)).await;

        let description = format!("restaurant: {}", restaurant);
        if self
            .interactor
            .resolve_and_act(&set, &description, self.locator_timeout())
            .await
        {
            info!("Selected restaurant: {}", restaurant);
            sleep(secs(self.config.timing.restaurant_page_settle_secs)).await;
            return Ok(true);
        }

        error!("Could not find restaurant: {}", restaurant);
        Ok(false)
    }

    pub(super) async fn add_item_to_cart(&self) -> StepResult {
        sleep(secs(self.config.timing.menu_load_secs)).await;

        let outcome = self
            .interactor
            .click(
                &self.config.site.locators.add_item,
                "add item button",
                &ClickOptions::scripted(self.element_wait()),
            )
            .await;
        if !outcome.is_success() {
            error!("Could not add an item to the cart");
            return Ok(false);
        }

        info!("Added first item to cart");
        sleep(secs(self.config.timing.after_add_item_secs)).await;
        Ok(true)
    }

    pub(super) async fn view_cart_and_select_address(&self) -> StepResult {
        if !self
            .interactor
            .resolve_and_act(
                &self.config.site.locators.view_cart,
                "view cart button",
                self.locator_timeout(),
            )
            .await
        {
            error!("Could not find view cart button");
            return Ok(false);
        }
        sleep(secs(self.config.timing.cart_settle_secs)).await;

        if !self.select_address().await {
            error!("Could not select home address");
            return Ok(false);
        }
        info!("Successfully viewed cart and selected home address");
        Ok(true)
    }

    /// Home address, then any address, then a timed manual hand-off.
    /// The hand-off always succeeds: the operator finishes checkout anyway.
    async fn select_address(&self) -> bool {
        let locators = &self.config.site.locators;
        let timing = &self.config.timing;
        let options = ClickOptions::scripted(self.element_wait());

        sleep(secs(timing.address_section_settle_secs)).await;

        if self
            .interactor
            .click(&locators.home_address, "home address", &options)
            .await
            .is_success()
        {
            info!("Selected home address");
            sleep(secs(timing.after_address_select_secs)).await;
            return true;
        }

        warn!("Home address not found, trying to select first available address");
        if self
            .interactor
            .click(&locators.any_address, "first available address", &options)
            .await
            .is_success()
        {
            info!("Selected first available address");
            sleep(secs(timing.after_address_select_secs)).await;
            return true;
        }

        warn!("No address could be selected automatically");
        self.output.say(&format!(
            "Please select your delivery address manually within {} seconds...",
            timing.manual_address_wait_secs
        ));
        sleep(secs(timing.manual_address_wait_secs)).await;
        true
    }
}

/// Keep the last four digits; the log file outlives the run.
fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let keep = chars.len().min(4);
    let hidden = chars.len() - keep;
    let mut masked = "*".repeat(hidden);
    masked.extend(&chars[hidden..]);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("9391496810"), "******6810");
        assert_eq!(mask_phone("123"), "123");
        assert_eq!(mask_phone(""), "");
    }
}
