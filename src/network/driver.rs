use core::net::Ipv4Addr;

use heapless::String;

use super::config::{IpAssignment, PASSWORD_MAX, SSID_MAX};
use super::types::{Interface, RadioMode};

#[cfg(test)]
pub(crate) mod mock;

/// Sentinel for "this interface holds no address".
pub const NO_ADDRESS: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Station scan behavior, applied once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanPolicy {
    pub all_channels: bool,
    pub sort_by_signal: bool,
}

impl ScanPolicy {
    /// Scan every channel and join the strongest matching AP.
    pub const THOROUGH: Self = Self {
        all_channels: true,
        sort_by_signal: true,
    };
}

/// Credentials handed to the driver for a fresh association.
#[derive(Clone, Copy, Debug)]
pub struct StationCredentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

/// Seam to the platform network drivers.
///
/// Commands return `true` on success. The supervisor logs failures and
/// carries on in a defined mode; nothing here escalates into a hard fault.
/// All calls must return immediately, the driver pushes completion back as
/// [`LinkEvent`](super::types::LinkEvent)s.
///
/// Contract notes:
/// - `set_hostname` on the station interface only latches a pending name;
///   the radio applies it when the interface leaves and re-enters station
///   mode. The supervisor performs that bounce itself.
/// - `dns_redirector_start` binds a wildcard redirector to the given
///   address, answering every query with it and a no-error reply code.
/// - `mdns_advertise` publishes the platform's fixed service set (HTTP plus
///   the device service with a firmware version TXT record).
pub trait NetworkDriver {
    fn set_scan_policy(&mut self, policy: ScanPolicy);

    /// Begin a station association; `None` reuses credentials already
    /// stored in the radio.
    fn begin_station(&mut self, credentials: Option<StationCredentials<'_>>) -> bool;
    /// Tear the station association down. With `forget_credentials` the
    /// radio also drops its stored SSID/PSK.
    fn end_station(&mut self, forget_credentials: bool);
    fn stored_ssid(&self) -> String<SSID_MAX>;
    fn stored_psk(&self) -> String<PASSWORD_MAX>;

    fn set_radio_mode(&mut self, mode: RadioMode) -> bool;
    fn start_access_point(
        &mut self,
        address: Ipv4Addr,
        netmask: Ipv4Addr,
        ssid: &str,
        password: &str,
    ) -> bool;

    fn apply_ip_config(&mut self, interface: Interface, assignment: &IpAssignment) -> bool;
    fn set_hostname(&mut self, interface: Interface, hostname: &str) -> bool;

    /// Whether an optional wired-adapter chip is present and wired up.
    fn wired_adapter_present(&self) -> bool;
    fn start_wired(&mut self) -> bool;
    /// MAC of the wired-adapter chip itself, when one is present.
    fn wired_adapter_mac(&self) -> Option<[u8; 6]>;

    fn local_ip(&self, interface: Interface) -> Ipv4Addr;
    fn subnet_mask(&self, interface: Interface) -> Ipv4Addr;
    fn gateway_ip(&self, interface: Interface) -> Ipv4Addr;
    /// `slot` selects the primary (0) or secondary (1) resolver.
    fn dns_ip(&self, interface: Interface, slot: u8) -> Ipv4Addr;
    fn mac_address(&self, interface: Interface) -> [u8; 6];

    fn dns_redirector_start(&mut self, address: Ipv4Addr) -> bool;
    fn dns_redirector_stop(&mut self);
    /// Serve at most one pending redirector query; called once per tick.
    fn dns_redirector_pump(&mut self);

    fn mdns_start(&mut self, hostname: &str) -> bool;
    fn mdns_advertise(&mut self);
    fn mdns_stop(&mut self);
}
