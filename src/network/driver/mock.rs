//! Recording driver used by the host test suites.

use core::net::Ipv4Addr;

use super::{NetworkDriver, ScanPolicy, StationCredentials};
use crate::network::config::{IpAssignment, PASSWORD_MAX, SSID_MAX};
use crate::network::types::{Interface, RadioMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    ScanPolicy(ScanPolicy),
    BeginStation { new_credentials: bool },
    EndStation { forget_credentials: bool },
    RadioMode(RadioMode),
    StartAccessPoint { ssid: String, password: String },
    ApplyIp { interface: Interface, dhcp: bool },
    SetHostname { interface: Interface, hostname: String },
    StartWired,
    DnsStart(Ipv4Addr),
    DnsStop,
    DnsPump,
    MdnsStart(String),
    MdnsAdvertise,
    MdnsStop,
}

pub(crate) struct MockDriver {
    pub(crate) commands: Vec<Command>,
    pub(crate) station_ip: Ipv4Addr,
    pub(crate) wired_ip: Ipv4Addr,
    pub(crate) radio_ssid: heapless::String<SSID_MAX>,
    pub(crate) radio_psk: heapless::String<PASSWORD_MAX>,
    pub(crate) wired_present: bool,
    pub(crate) wired_chip_mac: Option<[u8; 6]>,
    /// When false every command still records but reports failure.
    pub(crate) succeed: bool,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self {
            commands: Vec::new(),
            station_ip: super::NO_ADDRESS,
            wired_ip: super::NO_ADDRESS,
            radio_ssid: heapless::String::new(),
            radio_psk: heapless::String::new(),
            wired_present: false,
            wired_chip_mac: None,
            succeed: true,
        }
    }

    pub(crate) fn radio_modes(&self) -> Vec<RadioMode> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::RadioMode(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &Command) -> usize {
        self.commands.iter().filter(|c| *c == wanted).count()
    }

    pub(crate) fn clear(&mut self) {
        self.commands.clear();
    }
}

impl NetworkDriver for MockDriver {
    fn set_scan_policy(&mut self, policy: ScanPolicy) {
        self.commands.push(Command::ScanPolicy(policy));
    }

    fn begin_station(&mut self, credentials: Option<StationCredentials<'_>>) -> bool {
        if let Some(credentials) = credentials {
            self.radio_ssid.clear();
            let _ = self.radio_ssid.push_str(credentials.ssid);
            self.radio_psk.clear();
            let _ = self.radio_psk.push_str(credentials.password);
        }
        self.commands.push(Command::BeginStation {
            new_credentials: credentials.is_some(),
        });
        self.succeed
    }

    fn end_station(&mut self, forget_credentials: bool) {
        if forget_credentials {
            self.radio_ssid.clear();
            self.radio_psk.clear();
        }
        self.commands.push(Command::EndStation { forget_credentials });
    }

    fn stored_ssid(&self) -> heapless::String<SSID_MAX> {
        self.radio_ssid.clone()
    }

    fn stored_psk(&self) -> heapless::String<PASSWORD_MAX> {
        self.radio_psk.clone()
    }

    fn set_radio_mode(&mut self, mode: RadioMode) -> bool {
        self.commands.push(Command::RadioMode(mode));
        self.succeed
    }

    fn start_access_point(
        &mut self,
        _address: Ipv4Addr,
        _netmask: Ipv4Addr,
        ssid: &str,
        password: &str,
    ) -> bool {
        self.commands.push(Command::StartAccessPoint {
            ssid: ssid.into(),
            password: password.into(),
        });
        self.succeed
    }

    fn apply_ip_config(&mut self, interface: Interface, assignment: &IpAssignment) -> bool {
        self.commands.push(Command::ApplyIp {
            interface,
            dhcp: matches!(assignment, IpAssignment::Dhcp),
        });
        self.succeed
    }

    fn set_hostname(&mut self, interface: Interface, hostname: &str) -> bool {
        self.commands.push(Command::SetHostname {
            interface,
            hostname: hostname.into(),
        });
        self.succeed
    }

    fn wired_adapter_present(&self) -> bool {
        self.wired_present
    }

    fn start_wired(&mut self) -> bool {
        self.commands.push(Command::StartWired);
        self.succeed
    }

    fn wired_adapter_mac(&self) -> Option<[u8; 6]> {
        self.wired_chip_mac
    }

    fn local_ip(&self, interface: Interface) -> Ipv4Addr {
        match interface {
            Interface::Station => self.station_ip,
            Interface::Wired => self.wired_ip,
        }
    }

    fn subnet_mask(&self, _interface: Interface) -> Ipv4Addr {
        Ipv4Addr::new(255, 255, 255, 0)
    }

    fn gateway_ip(&self, interface: Interface) -> Ipv4Addr {
        match interface {
            Interface::Station => Ipv4Addr::new(10, 0, 0, 1),
            Interface::Wired => Ipv4Addr::new(10, 0, 1, 1),
        }
    }

    fn dns_ip(&self, _interface: Interface, slot: u8) -> Ipv4Addr {
        Ipv4Addr::new(9, 9, 9, slot)
    }

    fn mac_address(&self, interface: Interface) -> [u8; 6] {
        match interface {
            Interface::Station => [0x11; 6],
            Interface::Wired => [0x22; 6],
        }
    }

    fn dns_redirector_start(&mut self, address: Ipv4Addr) -> bool {
        self.commands.push(Command::DnsStart(address));
        self.succeed
    }

    fn dns_redirector_stop(&mut self) {
        self.commands.push(Command::DnsStop);
    }

    fn dns_redirector_pump(&mut self) {
        self.commands.push(Command::DnsPump);
    }

    fn mdns_start(&mut self, hostname: &str) -> bool {
        self.commands.push(Command::MdnsStart(hostname.into()));
        self.succeed
    }

    fn mdns_advertise(&mut self) {
        self.commands.push(Command::MdnsAdvertise);
    }

    fn mdns_stop(&mut self) {
        self.commands.push(Command::MdnsStop);
    }
}
