pub mod chromedriver;
pub mod driver;
pub mod webdriver;

pub use driver::WebDriverDriver;
