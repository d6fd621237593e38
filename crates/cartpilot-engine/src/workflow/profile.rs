//! Site-specific data: URLs, login markers and the locator sets for every
//! logical target the order workflow touches.
//!
//! Everything here can be overridden from the `site:` section of the config
//! file; the defaults target swiggy.com.

use crate::locator::{Locator, LocatorSet};
use serde::{Deserialize, Serialize};

/// Template token replaced with the restaurant name.
pub const RESTAURANT_TOKEN: &str = "restaurant";

/// A locator checked (not acted on) when dumping page state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedProbe {
    pub name: String,
    pub locator: Locator,
}

impl NamedProbe {
    pub fn xpath(name: &str, query: &str) -> Self {
        Self {
            name: name.to_string(),
            locator: Locator::xpath(query),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    pub home_url: String,
    pub search_url: String,
    /// Substring of the URL once the site is loaded at all.
    pub host_marker: String,
    /// Substring (case-insensitive) present while still on the login flow.
    pub login_marker: String,
    pub locators: SiteLocators,
    pub diagnostics: Vec<NamedProbe>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            home_url: "https://www.swiggy.com/".to_string(),
            search_url: "https://www.swiggy.com/search".to_string(),
            host_marker: "swiggy.com".to_string(),
            login_marker: "login".to_string(),
            locators: SiteLocators::default(),
            diagnostics: default_diagnostics(),
        }
    }
}

impl SiteProfile {
    /// Logged in iff the page is on the site and off the login flow.
    pub fn is_logged_in_url(&self, url: &str) -> bool {
        url.contains(&self.host_marker)
            && !url
                .to_lowercase()
                .contains(&self.login_marker.to_lowercase())
    }

    pub fn restaurant_locators(&self, restaurant: &str) -> LocatorSet {
        self.locators
            .restaurant
            .render(&[(RESTAURANT_TOKEN, restaurant)])
    }

    pub fn locator_sets(&self) -> Vec<(&'static str, &LocatorSet)> {
        let l = &self.locators;
        vec![
            ("login_button", &l.login_button),
            ("phone_input", &l.phone_input),
            ("continue_after_phone", &l.continue_after_phone),
            ("verify_button", &l.verify_button),
            ("search_input", &l.search_input),
            ("restaurant", &l.restaurant),
            ("add_item", &l.add_item),
            ("view_cart", &l.view_cart),
            ("home_address", &l.home_address),
            ("any_address", &l.any_address),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocators {
    pub login_button: LocatorSet,
    pub phone_input: LocatorSet,
    pub continue_after_phone: LocatorSet,
    pub verify_button: LocatorSet,
    pub search_input: LocatorSet,
    /// Rendered with `{restaurant}` before use.
    pub restaurant: LocatorSet,
    pub add_item: LocatorSet,
    pub view_cart: LocatorSet,
    pub home_address: LocatorSet,
    /// Fallback when no address is labelled "Home".
    pub any_address: LocatorSet,
}

impl Default for SiteLocators {
    fn default() -> Self {
        Self {
            login_button: LocatorSet::new(vec![
                Locator::xpath("//a[contains(text(),'Sign in')]"),
                Locator::xpath("//span[contains(text(),'Sign In')]"),
                Locator::xpath("//div[contains(text(),'Sign in')]"),
                Locator::xpath("//button[contains(text(),'Login')]"),
                Locator::xpath("//*[contains(@class, 'login') or contains(@class, 'sign-in')]"),
                Locator::css("[data-testid='login-cta']"),
            ]),
            phone_input: LocatorSet::new(vec![
                Locator::xpath("//input[@type='tel']"),
                Locator::xpath("//input[@id='mobile']"),
                Locator::xpath(
                    "//input[contains(@placeholder,'mobile') or contains(@placeholder,'phone')]",
                ),
                Locator::css("input[type='tel']"),
                Locator::xpath("//input[@name='mobile']"),
            ]),
            continue_after_phone: LocatorSet::new(vec![
                Locator::xpath(
                    "//button[contains(text(),'Login') or contains(text(),'Continue') or contains(text(),'Send OTP')]",
                ),
                Locator::xpath(
                    "//a[contains(text(),'Login') or contains(text(),'Continue') or contains(text(),'Send OTP')]",
                ),
                Locator::css("[data-testid='login-cta']"),
                Locator::xpath("//button[contains(@class, 'login') or contains(@class, 'continue')]"),
            ]),
            verify_button: LocatorSet::new(vec![
                Locator::xpath(
                    "//button[contains(text(),'Verify') or contains(text(),'Continue') or contains(text(),'Proceed')]",
                ),
                Locator::xpath(
                    "//a[contains(text(),'Verify') or contains(text(),'Continue') or contains(text(),'Proceed')]",
                ),
                Locator::css("[data-testid='verify-cta']"),
                Locator::xpath("//button[contains(@class, 'verify') or contains(@class, 'continue')]"),
            ]),
            search_input: LocatorSet::new(vec![
                Locator::xpath("//input[contains(@placeholder,'Search')]"),
                Locator::xpath("//input[contains(@placeholder,'restaurants')]"),
                Locator::xpath("//input[contains(@placeholder,'dishes')]"),
                Locator::css("input[placeholder*='Search']"),
                Locator::xpath("//*[contains(@class, 'search')]//input"),
                Locator::xpath("//input[@type='text']"),
                Locator::xpath("//input[@name='searchQuery']"),
            ]),
            restaurant: LocatorSet::xpaths(&[
                "//div[contains(text(),'{restaurant}')]",
                "//h3[contains(text(),'{restaurant}')]",
                "//span[contains(text(),'{restaurant}')]",
                "//*[contains(text(),'{restaurant}')]",
                "//a[contains(text(),'{restaurant}')]",
                "//div[contains(@class, 'restaurant') and contains(text(),'{restaurant}')]",
                "//div[contains(@class, 'RestaurantList')]//div[contains(text(),'{restaurant}')]",
            ]),
            add_item: LocatorSet::new(vec![
                Locator::xpath("//button[contains(text(),'ADD') or contains(text(),'Add')]"),
                Locator::xpath("//div[contains(text(),'ADD') or contains(text(),'Add')]"),
                Locator::css("[data-testid='add-item-btn']"),
                Locator::xpath("//*[contains(@class, 'add-btn') or contains(@class, 'add-button')]"),
                Locator::xpath("//button[contains(@class, 'styles_base__') and contains(text(), 'ADD')]"),
            ]),
            view_cart: LocatorSet::new(vec![
                Locator::xpath("//span[contains(text(),'View Cart')]"),
                Locator::xpath("//button[contains(text(),'View Cart')]"),
                Locator::css("[data-testid='view-cart-btn']"),
                Locator::xpath("//*[contains(@class, 'view-cart')]"),
                Locator::xpath("//div[contains(text(),'View Cart')]"),
                Locator::xpath("//a[contains(text(),'View Cart')]"),
            ]),
            home_address: LocatorSet::xpaths(&[
                "//div[contains(text(),'Home') or contains(text(),'HOME')]",
                "//span[contains(text(),'Home') or contains(text(),'HOME')]",
                "//*[contains(@class, 'address') and contains(text(), 'Home')]",
                "//label[contains(text(),'Home')]",
                "//div[contains(@class, 'address-type') and contains(text(), 'Home')]",
                "//button[contains(text(),'Home')]",
                "//*[contains(@data-testid, 'address') and contains(text(), 'Home')]",
            ]),
            any_address: LocatorSet::xpaths(&[
                "//div[contains(@class, 'address-item')]",
                "//div[contains(@class, 'address-card')]",
                "//button[contains(@class, 'address')]",
                "//*[contains(@class, 'address') and contains(@class, 'selectable')]",
                "//label[contains(@class, 'address')]",
                "//div[contains(@class, 'delivery-address')]",
            ]),
        }
    }
}

fn default_diagnostics() -> Vec<NamedProbe> {
    vec![
        NamedProbe::xpath("OTP input", "//input[@type='tel' and @maxlength='6']"),
        NamedProbe::xpath(
            "OTP input",
            "//input[contains(@placeholder,'OTP') or contains(@placeholder,'otp')]",
        ),
        NamedProbe::xpath("Verify button", "//button[contains(text(),'Verify')]"),
        NamedProbe::xpath("Continue button", "//button[contains(text(),'Continue')]"),
        NamedProbe::xpath("Login form", "//form"),
        NamedProbe::xpath(
            "Error message",
            "//*[contains(@class, 'error') or contains(text(), 'error')]",
        ),
    ]
}
