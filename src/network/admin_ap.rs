//! Admin access point lifecycle.
//!
//! The AP opens on every switch into station mode (and at startup) so the
//! device stays administrable, then auto-disables after a configured number
//! of minutes without upstream connectivity. A wildcard DNS redirector runs
//! for exactly as long as the AP is enabled, so captive clients land on the
//! admin pages.

use log::{info, warn};

use super::config::{NetworkConfig, AP_ADDRESS, AP_NETMASK};
use super::driver::NetworkDriver;
use super::types::{NetworkMode, RadioMode};

/// Countdown notice cadence while a nonzero limit is armed.
const NOTICE_PERIOD_S: u32 = 10;

pub(crate) struct AdminAccessPoint {
    enabled: bool,
    timeout_counter_s: u32,
    timeout_limit_s: u32,
    dns_redirector_running: bool,
    notice_elapsed_s: u32,
}

impl AdminAccessPoint {
    pub(crate) const fn new() -> Self {
        Self {
            enabled: false,
            timeout_counter_s: 0,
            timeout_limit_s: 0,
            dns_redirector_running: false,
            notice_elapsed_s: 0,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(test)]
    pub(crate) fn dns_redirector_running(&self) -> bool {
        self.dns_redirector_running
    }

    /// Opens the AP and arms a fresh timeout window from configuration.
    pub(crate) fn enable<D: NetworkDriver>(
        &mut self,
        driver: &mut D,
        config: &NetworkConfig,
        ap_name: &str,
        mode: NetworkMode,
    ) {
        self.enabled = true;
        self.timeout_counter_s = 0;
        self.notice_elapsed_s = 0;
        self.timeout_limit_s = config.ap_timeout_minutes.saturating_mul(60);
        self.apply(driver, config, ap_name, mode);
    }

    /// Closes the AP and drops the radio to whatever the current mode
    /// needs: station-only in wifi mode, fully off otherwise.
    pub(crate) fn disable<D: NetworkDriver>(&mut self, driver: &mut D, mode: NetworkMode) {
        self.enabled = false;
        driver.dns_redirector_stop();
        self.dns_redirector_running = false;
        let radio = if mode == NetworkMode::WifiStation {
            RadioMode::Station
        } else {
            RadioMode::Off
        };
        if !driver.set_radio_mode(radio) {
            warn!("admin ap: radio mode change failed");
        }
    }

    /// Reconciles radio, AP broadcast and DNS redirector with the current
    /// admin state. The radio holds mirrors of all of this, so repeating
    /// the call is harmless.
    pub(crate) fn apply<D: NetworkDriver>(
        &mut self,
        driver: &mut D,
        config: &NetworkConfig,
        ap_name: &str,
        mode: NetworkMode,
    ) {
        if !self.enabled {
            self.disable(driver, mode);
            return;
        }
        if !driver.set_radio_mode(RadioMode::ApStation) {
            warn!("admin ap: radio mode change failed");
        }
        if !driver.start_access_point(AP_ADDRESS, AP_NETMASK, ap_name, &config.admin_password) {
            warn!("admin ap: broadcast start failed");
        }
        self.dns_redirector_running = driver.dns_redirector_start(AP_ADDRESS);
        if !self.dns_redirector_running {
            // Captive redirect stays off; the AP itself keeps working.
            warn!("admin ap: dns redirector start failed");
        }
    }

    /// Advances the auto-disable countdown by `elapsed_s` wall-clock
    /// seconds. Returns true when this call disabled the AP.
    pub(crate) fn tick<D: NetworkDriver>(
        &mut self,
        driver: &mut D,
        mode: NetworkMode,
        connected: bool,
        elapsed_s: u32,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        if self.timeout_limit_s > 0 {
            self.notice_elapsed_s += elapsed_s;
            if self.notice_elapsed_s >= NOTICE_PERIOD_S {
                self.notice_elapsed_s %= NOTICE_PERIOD_S;
                info!(
                    "admin ap: {} / {} s towards auto-disable",
                    self.timeout_counter_s, self.timeout_limit_s
                );
            }
        }
        if connected {
            self.timeout_counter_s = 0;
            return false;
        }
        if self.timeout_limit_s == 0 {
            return false;
        }
        self.timeout_counter_s = self.timeout_counter_s.saturating_add(elapsed_s);
        if self.timeout_counter_s > self.timeout_limit_s {
            info!("admin ap: timeout reached, disabling");
            self.disable(driver, mode);
            return true;
        }
        false
    }
}
