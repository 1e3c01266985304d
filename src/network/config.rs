use core::net::Ipv4Addr;

use heapless::String;

pub const SSID_MAX: usize = 32;
pub const PASSWORD_MAX: usize = 64;
pub const HOSTNAME_MAX: usize = 32;
pub const AP_NAME_MAX: usize = 32;

/// The admin AP always lives on this fixed /24, with itself as gateway.
pub const AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);
pub const AP_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Broadcast SSID is this prefix followed by the decimal device id.
pub const ACCESS_POINT_PREFIX: &str = "SunGate-";

/// Used whenever the configured hostname template sanitizes to nothing.
pub const HOSTNAME_FALLBACK_TEMPLATE: &str = "sungate-%u";

/// Addressing for whichever interface is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpAssignment {
    Dhcp,
    Static {
        address: Ipv4Addr,
        gateway: Ipv4Addr,
        netmask: Ipv4Addr,
        dns1: Ipv4Addr,
        dns2: Ipv4Addr,
    },
}

/// Read-only network configuration, owned by the persisted-settings layer.
///
/// The supervisor never writes this; it re-reads it on every tick so edits
/// made through the admin surface take effect without a restart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub ssid: String<SSID_MAX>,
    pub password: String<PASSWORD_MAX>,
    pub hostname_template: String<HOSTNAME_MAX>,
    pub admin_password: String<PASSWORD_MAX>,
    /// Minutes without upstream connectivity before the admin AP
    /// auto-disables; 0 keeps it open forever.
    pub ap_timeout_minutes: u32,
    pub ip: IpAssignment,
    pub mdns_enabled: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut hostname_template = String::new();
        let _ = hostname_template.push_str(HOSTNAME_FALLBACK_TEMPLATE);
        Self {
            ssid: String::new(),
            password: String::new(),
            hostname_template,
            admin_password: String::new(),
            ap_timeout_minutes: 3,
            ip: IpAssignment::Dhcp,
            mdns_enabled: false,
        }
    }
}
