//! Root of the network stack: owns the driver, arbitrates the active
//! interface, and ticks the admin AP, the reconnect policy, the DNS
//! redirector and the mDNS toggle.
//!
//! Single-threaded by contract: `handle_link_event` and `tick` both run on
//! the cooperative scheduler's one logical thread, which is why the shared
//! flags here need no synchronization. Preserve that guarantee when wiring
//! a new runtime.

use core::fmt::Write as _;
use core::net::Ipv4Addr;

use embassy_time::{Duration, Instant};
use heapless::String;
use log::{info, warn};

use super::admin_ap::AdminAccessPoint;
use super::config::{NetworkConfig, ACCESS_POINT_PREFIX, AP_NAME_MAX, HOSTNAME_MAX};
use super::driver::{NetworkDriver, ScanPolicy, StationCredentials, NO_ADDRESS};
use super::event_bus::{EventBus, EventCallback, SubscribeError};
use super::hostname;
use super::machine::{ModeEngine, ModeSwitch};
use super::reconnect::{ReconnectSupervisor, SearchAction};
use super::types::{EventFilter, Interface, LinkEvent, NetworkEvent, NetworkMode, RadioMode};


/// Mask reported while no interface is active.
const SUBNET_FALLBACK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

pub struct NetworkSupervisor<D: NetworkDriver> {
    driver: D,
    device_id: u32,
    mode_engine: ModeEngine,
    /// Latched by wired link events, consumed by `tick`.
    ethernet_link_up: bool,
    bus: EventBus,
    admin_ap: AdminAccessPoint,
    reconnect: ReconnectSupervisor,
    last_timer_advance: Instant,
    last_mdns_enabled: bool,
}

impl<D: NetworkDriver> NetworkSupervisor<D> {
    pub fn new(driver: D, device_id: u32) -> Self {
        Self {
            driver,
            device_id,
            mode_engine: ModeEngine::new(),
            ethernet_link_up: false,
            bus: EventBus::new(),
            admin_ap: AdminAccessPoint::new(),
            reconnect: ReconnectSupervisor::new(),
            last_timer_advance: Instant::from_ticks(0),
            last_mdns_enabled: false,
        }
    }

    /// Startup: scan policy, stale-association reset, wired bring-up if an
    /// adapter is present, and the initial admin AP. The composition root
    /// wires link events and the periodic tick afterwards.
    pub fn init(&mut self, config: &NetworkConfig, now: Instant) {
        self.last_timer_advance = now;

        self.driver.set_scan_policy(ScanPolicy::THOROUGH);
        // Forget whatever association the radio still holds from the last
        // boot; bring-up decides credentials freshly.
        self.driver.end_station(true);

        if self.driver.wired_adapter_present() {
            if self.driver.start_wired() {
                info!("network: wired adapter started");
            } else {
                warn!("network: wired adapter start failed");
            }
        }

        self.enable_admin_mode(config);
    }

    /// Registers a subscriber for semantic connectivity events.
    pub fn on_event(
        &mut self,
        callback: EventCallback,
        filter: EventFilter,
    ) -> Result<(), SubscribeError> {
        self.bus.subscribe(callback, filter)
    }

    /// Force-opens the admin AP outside the startup/fallback path (button
    /// press, admin request).
    pub fn enable_admin_mode(&mut self, config: &NetworkConfig) {
        let mode = self.mode();
        let name = self.access_point_name();
        self.admin_ap.enable(&mut self.driver, config, &name, mode);
    }

    /// Consumes a driver link event. Runs on the scheduler's event-delivery
    /// context; must stay short.
    pub fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::WiredStart => {
                info!("network: wired start");
                if self.mode() == NetworkMode::Ethernet {
                    self.bus.publish(NetworkEvent::Start);
                }
            }
            LinkEvent::WiredStop => {
                info!("network: wired stop");
                if self.mode() == NetworkMode::Ethernet {
                    self.bus.publish(NetworkEvent::Stop);
                }
            }
            LinkEvent::WiredConnected => {
                info!("network: wired link up");
                self.ethernet_link_up = true;
                if self.mode() == NetworkMode::Ethernet {
                    self.bus.publish(NetworkEvent::Connected);
                }
            }
            LinkEvent::WiredDisconnected => {
                info!("network: wired link down");
                self.ethernet_link_up = false;
                if self.mode() == NetworkMode::Ethernet {
                    self.bus.publish(NetworkEvent::Disconnected);
                }
            }
            LinkEvent::WiredGotIp => {
                info!("network: wired got address");
                if self.mode() == NetworkMode::Ethernet {
                    self.bus.publish(NetworkEvent::GotIp);
                }
            }
            LinkEvent::StationConnected => {
                info!("network: station connected");
                if self.mode() == NetworkMode::WifiStation {
                    self.bus.publish(NetworkEvent::Connected);
                }
            }
            LinkEvent::StationGotIp => {
                info!("network: station got address");
                if self.mode() == NetworkMode::WifiStation {
                    self.bus.publish(NetworkEvent::GotIp);
                }
            }
            LinkEvent::StationDisconnected { reason } => {
                if self.mode() == NetworkMode::WifiStation {
                    info!("network: station disconnected, reason {}", reason);
                    // Sole reconnect path: restart the association at once
                    // and lean on the driver's internal retry. The driver
                    // may retry on its own as well; the double trigger is
                    // accepted behavior.
                    self.driver.end_station(false);
                    if !self.driver.begin_station(None) {
                        warn!("network: station restart failed");
                    }
                    self.bus.publish(NetworkEvent::Disconnected);
                }
            }
        }
    }

    /// One scheduler pass: arbitrate the interface, advance wall-clock
    /// timers, run the admin-AP and reconnect bookkeeping, pump the DNS
    /// redirector and reconcile mDNS. Never blocks.
    pub fn tick(&mut self, config: &NetworkConfig, now: Instant) {
        match self.mode_engine.evaluate(self.ethernet_link_up) {
            ModeSwitch::ToEthernet => self.switch_to_ethernet(config),
            ModeSwitch::ToWifiStation => self.switch_to_wifi(config),
            ModeSwitch::None => {}
        }

        let elapsed_s = self.advance_timers(now);
        let connected = self.is_connected();
        let mode = self.mode();
        self.admin_ap
            .tick(&mut self.driver, mode, connected, elapsed_s);
        match self
            .reconnect
            .tick(connected, self.admin_ap.is_enabled(), elapsed_s)
        {
            SearchAction::Suspend => {
                info!("network: pausing station search to free the admin ap");
                if !self.driver.set_radio_mode(RadioMode::AccessPoint) {
                    warn!("network: radio mode change failed");
                }
            }
            SearchAction::Resume => {
                info!("network: resuming station search");
                if !self.driver.set_radio_mode(RadioMode::ApStation) {
                    warn!("network: radio mode change failed");
                }
                self.apply_station_config(config);
            }
            SearchAction::None => {}
        }

        if self.admin_ap.is_enabled() {
            self.driver.dns_redirector_pump();
        }

        self.refresh_mdns(config);
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode_engine.mode()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Escape hatch for the composition root (event polling, runtime
    /// maintenance). Core logic never reaches through this.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    #[cfg(test)]
    pub(crate) fn admin_ap(&self) -> &AdminAccessPoint {
        &self.admin_ap
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        match self.active_interface() {
            Some(interface) => self.driver.local_ip(interface),
            None => NO_ADDRESS,
        }
    }

    pub fn subnet_mask(&self) -> Ipv4Addr {
        match self.active_interface() {
            Some(interface) => self.driver.subnet_mask(interface),
            None => SUBNET_FALLBACK,
        }
    }

    pub fn gateway_ip(&self) -> Ipv4Addr {
        match self.active_interface() {
            Some(interface) => self.driver.gateway_ip(interface),
            None => NO_ADDRESS,
        }
    }

    pub fn dns_ip(&self, slot: u8) -> Ipv4Addr {
        match self.active_interface() {
            Some(interface) => self.driver.dns_ip(interface, slot),
            None => NO_ADDRESS,
        }
    }

    /// MAC of the active interface; in ethernet mode the wired-adapter
    /// chip's own MAC wins when such a chip is present.
    pub fn mac_address(&self) -> Option<[u8; 6]> {
        match self.mode() {
            NetworkMode::Undefined => None,
            NetworkMode::WifiStation => Some(self.driver.mac_address(Interface::Station)),
            NetworkMode::Ethernet => Some(
                self.driver
                    .wired_adapter_mac()
                    .unwrap_or_else(|| self.driver.mac_address(Interface::Wired)),
            ),
        }
    }

    /// Heuristic: an interface with a nonzero first address octet counts
    /// as connected. Degenerate leases can fool this; treat it as a
    /// liveness hint, not a link-state oracle.
    pub fn is_connected(&self) -> bool {
        self.driver.local_ip(Interface::Station).octets()[0] != 0
            || self.driver.local_ip(Interface::Wired).octets()[0] != 0
    }

    pub fn hostname(&self, config: &NetworkConfig) -> String<HOSTNAME_MAX> {
        hostname::sanitize(&config.hostname_template, self.device_id)
    }

    /// SSID the admin AP broadcasts.
    pub fn access_point_name(&self) -> String<AP_NAME_MAX> {
        let mut name = String::new();
        let _ = name.push_str(ACCESS_POINT_PREFIX);
        let _ = write!(name, "{}", self.device_id);
        name
    }

    fn active_interface(&self) -> Option<Interface> {
        match self.mode() {
            NetworkMode::Undefined => None,
            NetworkMode::WifiStation => Some(Interface::Station),
            NetworkMode::Ethernet => Some(Interface::Wired),
        }
    }

    /// Whole seconds since the last advancement, wall-clock driven so a
    /// jittery tick cadence cannot stretch the second-granularity timers.
    fn advance_timers(&mut self, now: Instant) -> u32 {
        let elapsed_ms = now
            .as_millis()
            .saturating_sub(self.last_timer_advance.as_millis());
        let whole_seconds = elapsed_ms / 1000;
        if whole_seconds == 0 {
            return 0;
        }
        // Keep the sub-second remainder for the next pass.
        self.last_timer_advance += Duration::from_secs(whole_seconds);
        whole_seconds.min(u32::MAX as u64) as u32
    }

    fn switch_to_ethernet(&mut self, config: &NetworkConfig) {
        info!("network: switching to ethernet");
        // AP and ethernet are mutually exclusive at the radio level: the
        // radio goes fully off, station and AP both.
        if self.admin_ap.is_enabled() {
            self.admin_ap.disable(&mut self.driver, NetworkMode::Ethernet);
        } else if !self.driver.set_radio_mode(RadioMode::Off) {
            warn!("network: radio mode change failed");
        }
        self.apply_ip_config(config);
        self.apply_hostname(config);
    }

    fn switch_to_wifi(&mut self, config: &NetworkConfig) {
        info!("network: switching to wifi station");
        self.enable_admin_mode(config);
        self.apply_station_config(config);
    }

    fn apply_station_config(&mut self, config: &NetworkConfig) {
        self.apply_hostname(config);

        if config.ssid.is_empty() {
            // Nothing to join; stay AP-only rather than hand the radio an
            // invalid association.
            info!("network: no station ssid configured, skipping bring-up");
            return;
        }

        let new_credentials = self.driver.stored_ssid() != config.ssid
            || self.driver.stored_psk() != config.password;
        info!(
            "network: configuring station with {} credentials",
            if new_credentials { "new" } else { "stored" }
        );
        let ok = if new_credentials {
            self.driver.begin_station(Some(StationCredentials {
                ssid: &config.ssid,
                password: &config.password,
            }))
        } else {
            self.driver.begin_station(None)
        };
        if !ok {
            warn!("network: station bring-up failed");
        }

        self.apply_ip_config(config);
    }

    fn apply_ip_config(&mut self, config: &NetworkConfig) {
        let Some(interface) = self.active_interface() else {
            return;
        };
        let kind = match config.ip {
            super::config::IpAssignment::Dhcp => "dhcp",
            super::config::IpAssignment::Static { .. } => "static",
        };
        if self.driver.apply_ip_config(interface, &config.ip) {
            info!("network: {} addressing applied", kind);
        } else {
            warn!("network: {} addressing failed", kind);
        }
    }

    fn apply_hostname(&mut self, config: &NetworkConfig) {
        let mode = self.mode();
        let hostname = self.hostname(config);
        let ok = match mode {
            NetworkMode::Undefined => return,
            NetworkMode::Ethernet => self.driver.set_hostname(Interface::Wired, &hostname),
            NetworkMode::WifiStation => {
                let ok = self.driver.set_hostname(Interface::Station, &hostname);
                // Driver contract: the radio only latches a pending
                // hostname when the interface leaves and re-enters station
                // mode, so bounce it and then restore whatever mode the
                // admin AP wants.
                let _ = self.driver.set_radio_mode(RadioMode::ApStation);
                let _ = self.driver.set_radio_mode(RadioMode::Station);
                let name = self.access_point_name();
                self.admin_ap.apply(&mut self.driver, config, &name, mode);
                ok
            }
        };
        if ok {
            info!("network: hostname '{}' applied", hostname);
        } else {
            warn!("network: hostname '{}' rejected", hostname);
        }
    }

    fn refresh_mdns(&mut self, config: &NetworkConfig) {
        if self.last_mdns_enabled == config.mdns_enabled {
            return;
        }
        self.last_mdns_enabled = config.mdns_enabled;
        self.driver.mdns_stop();

        if !config.mdns_enabled {
            info!("network: mdns disabled");
            return;
        }
        let hostname = self.hostname(config);
        if !self.driver.mdns_start(&hostname) {
            warn!("network: mdns responder start failed");
            return;
        }
        self.driver.mdns_advertise();
        info!("network: mdns responder started");
    }
}
