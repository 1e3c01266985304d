//! esp32 runtime: esp-radio/embassy-net glue behind the driver seam.

mod bootstrap;
mod captive_dns;
mod esp_driver;

pub use bootstrap::run;
pub use esp_driver::EspNetworkDriver;
