//! `NetworkDriver` implementation over esp-radio and embassy-net.
//!
//! The radio keeps no queryable credential store, so the last credentials
//! handed to it are cached here; `begin_station(None)` replays them. The
//! pending hostname is likewise cached and only reaches the network when
//! the station interface is reconfigured, which is exactly the bounce the
//! supervisor performs after `set_hostname`.
//!
//! No wired adapter variant of this board exists, so the wired capability
//! reports absent and the supervisor never leaves station mode.

use core::net::Ipv4Addr;

use embassy_net::{ConfigV4, DhcpConfig, Ipv4Cidr, Stack, StaticConfigV4};
use esp_radio::wifi::{
    AccessPointConfig, ClientConfig, ModeConfig, WifiController,
};
use heapless::String;
use log::{debug, info, warn};

use crate::network::config::{IpAssignment, HOSTNAME_MAX, PASSWORD_MAX, SSID_MAX};
use crate::network::driver::{NetworkDriver, ScanPolicy, StationCredentials, NO_ADDRESS};
use crate::network::types::{Interface, LinkEvent, RadioMode};

use super::captive_dns::CaptiveDns;

pub struct EspNetworkDriver {
    controller: WifiController<'static>,
    stack: Stack<'static>,
    redirector: CaptiveDns,
    station_mac: [u8; 6],
    radio_mode: RadioMode,
    ssid: String<SSID_MAX>,
    psk: String<PASSWORD_MAX>,
    ap_ssid: String<SSID_MAX>,
    ap_password: String<PASSWORD_MAX>,
    pending_hostname: String<HOSTNAME_MAX>,
    was_connected: bool,
    had_address: bool,
}

impl EspNetworkDriver {
    pub fn new(
        controller: WifiController<'static>,
        stack: Stack<'static>,
        redirector: CaptiveDns,
        station_mac: [u8; 6],
    ) -> Self {
        Self {
            controller,
            stack,
            redirector,
            station_mac,
            radio_mode: RadioMode::Off,
            ssid: String::new(),
            psk: String::new(),
            ap_ssid: String::new(),
            ap_password: String::new(),
            pending_hostname: String::new(),
            was_connected: false,
            had_address: false,
        }
    }

    /// Samples the radio and stack for edges since the previous call and
    /// reports them as link events. The polled API does not surface the
    /// radio's disconnect reason, so it is reported as 0.
    pub fn poll_link_events(&mut self, mut sink: impl FnMut(LinkEvent)) {
        let connected = matches!(self.controller.is_connected(), Ok(true));
        if connected != self.was_connected {
            self.was_connected = connected;
            if connected {
                sink(LinkEvent::StationConnected);
            } else {
                sink(LinkEvent::StationDisconnected { reason: 0 });
            }
        }

        let has_address = self.stack.config_v4().is_some();
        if has_address != self.had_address {
            self.had_address = has_address;
            if has_address {
                sink(LinkEvent::StationGotIp);
            }
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_ssid(self.ssid.as_str().into())
            .with_password(self.psk.as_str().into())
    }

    fn ap_config(&self) -> AccessPointConfig {
        AccessPointConfig::default()
            .with_ssid(self.ap_ssid.as_str().into())
            .with_password(self.ap_password.as_str().into())
    }

    fn apply_radio_mode(&mut self) -> bool {
        let mode = match self.radio_mode {
            RadioMode::Off => {
                let _ = self.controller.disconnect();
                if let Err(err) = self.controller.stop() {
                    warn!("esp driver: radio stop err={:?}", err);
                    return false;
                }
                return true;
            }
            RadioMode::Station => ModeConfig::Client(self.client_config()),
            RadioMode::AccessPoint => ModeConfig::AccessPoint(self.ap_config()),
            RadioMode::ApStation => ModeConfig::ApSta(self.client_config(), self.ap_config()),
        };
        if let Err(err) = self.controller.set_config(&mode) {
            warn!("esp driver: radio config err={:?}", err);
            return false;
        }
        if !matches!(self.controller.is_started(), Ok(true)) {
            if let Err(err) = self.controller.start() {
                warn!("esp driver: radio start err={:?}", err);
                return false;
            }
        }
        true
    }
}

impl NetworkDriver for EspNetworkDriver {
    fn set_scan_policy(&mut self, policy: ScanPolicy) {
        // The radio already scans all channels and joins by signal
        // strength; nothing to forward for the policy in use.
        debug!("esp driver: scan policy {:?}", policy);
    }

    fn begin_station(&mut self, credentials: Option<StationCredentials<'_>>) -> bool {
        if let Some(credentials) = credentials {
            self.ssid.clear();
            let _ = self.ssid.push_str(credentials.ssid);
            self.psk.clear();
            let _ = self.psk.push_str(credentials.password);
        }
        if self.ssid.is_empty() {
            return false;
        }
        if !self.apply_radio_mode() {
            return false;
        }
        match self.controller.connect() {
            Ok(()) => true,
            Err(err) => {
                warn!("esp driver: connect err={:?}", err);
                false
            }
        }
    }

    fn end_station(&mut self, forget_credentials: bool) {
        if forget_credentials {
            self.ssid.clear();
            self.psk.clear();
        }
        let _ = self.controller.disconnect();
    }

    fn stored_ssid(&self) -> String<SSID_MAX> {
        self.ssid.clone()
    }

    fn stored_psk(&self) -> String<PASSWORD_MAX> {
        self.psk.clone()
    }

    fn set_radio_mode(&mut self, mode: RadioMode) -> bool {
        self.radio_mode = mode;
        self.apply_radio_mode()
    }

    fn start_access_point(
        &mut self,
        address: Ipv4Addr,
        _netmask: Ipv4Addr,
        ssid: &str,
        password: &str,
    ) -> bool {
        self.ap_ssid.clear();
        let _ = self.ap_ssid.push_str(ssid);
        self.ap_password.clear();
        let _ = self.ap_password.push_str(password);
        info!("esp driver: broadcasting '{}' at {}", ssid, address);
        self.apply_radio_mode()
    }

    fn apply_ip_config(&mut self, interface: Interface, assignment: &IpAssignment) -> bool {
        if interface != Interface::Station {
            return false;
        }
        let config = match assignment {
            IpAssignment::Dhcp => {
                let mut dhcp = DhcpConfig::default();
                if !self.pending_hostname.is_empty() {
                    let mut hostname = String::new();
                    let _ = hostname.push_str(&self.pending_hostname);
                    dhcp.hostname = Some(hostname);
                }
                ConfigV4::Dhcp(dhcp)
            }
            IpAssignment::Static {
                address,
                gateway,
                netmask,
                dns1,
                dns2,
            } => {
                let prefix = netmask.to_bits().count_ones() as u8;
                let mut dns_servers = heapless::Vec::new();
                for server in [dns1, dns2] {
                    if *server != NO_ADDRESS {
                        let _ = dns_servers.push(*server);
                    }
                }
                ConfigV4::Static(StaticConfigV4 {
                    address: Ipv4Cidr::new(*address, prefix),
                    gateway: Some(*gateway),
                    dns_servers,
                })
            }
        };
        self.stack.set_config_v4(config);
        true
    }

    fn set_hostname(&mut self, interface: Interface, hostname: &str) -> bool {
        if interface != Interface::Station {
            return false;
        }
        // Latched only: reaches the network on the next interface
        // reconfiguration, per the driver contract.
        self.pending_hostname.clear();
        let _ = self.pending_hostname.push_str(hostname);
        true
    }

    fn wired_adapter_present(&self) -> bool {
        false
    }

    fn start_wired(&mut self) -> bool {
        false
    }

    fn wired_adapter_mac(&self) -> Option<[u8; 6]> {
        None
    }

    fn local_ip(&self, interface: Interface) -> Ipv4Addr {
        match interface {
            Interface::Station => self
                .stack
                .config_v4()
                .map(|config| config.address.address())
                .unwrap_or(NO_ADDRESS),
            Interface::Wired => NO_ADDRESS,
        }
    }

    fn subnet_mask(&self, interface: Interface) -> Ipv4Addr {
        match interface {
            Interface::Station => self
                .stack
                .config_v4()
                .map(|config| {
                    let prefix = config.address.prefix_len() as u32;
                    Ipv4Addr::from_bits(u32::MAX.checked_shl(32 - prefix).unwrap_or(0))
                })
                .unwrap_or(NO_ADDRESS),
            Interface::Wired => NO_ADDRESS,
        }
    }

    fn gateway_ip(&self, interface: Interface) -> Ipv4Addr {
        match interface {
            Interface::Station => self
                .stack
                .config_v4()
                .and_then(|config| config.gateway)
                .unwrap_or(NO_ADDRESS),
            Interface::Wired => NO_ADDRESS,
        }
    }

    fn dns_ip(&self, interface: Interface, slot: u8) -> Ipv4Addr {
        match interface {
            Interface::Station => self
                .stack
                .config_v4()
                .and_then(|config| config.dns_servers.get(slot as usize).copied())
                .unwrap_or(NO_ADDRESS),
            Interface::Wired => NO_ADDRESS,
        }
    }

    fn mac_address(&self, interface: Interface) -> [u8; 6] {
        match interface {
            Interface::Station => self.station_mac,
            Interface::Wired => [0; 6],
        }
    }

    fn dns_redirector_start(&mut self, address: Ipv4Addr) -> bool {
        self.redirector.start(address)
    }

    fn dns_redirector_stop(&mut self) {
        self.redirector.stop();
    }

    fn dns_redirector_pump(&mut self) {
        self.redirector.pump();
    }

    fn mdns_start(&mut self, _hostname: &str) -> bool {
        // No responder is wired up on this runtime yet.
        // TODO: back this with an mdns responder over embassy-net
        // multicast UDP once the stack exposes IGMP join on the AP side.
        warn!("esp driver: mdns responder unavailable");
        false
    }

    fn mdns_advertise(&mut self) {}

    fn mdns_stop(&mut self) {}
}
