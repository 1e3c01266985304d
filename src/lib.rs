#![cfg_attr(not(test), no_std)]

pub mod network;
#[cfg(feature = "esp32-runtime")]
pub mod runtime;

pub use network::config::{IpAssignment, NetworkConfig};
pub use network::driver::{NetworkDriver, ScanPolicy, StationCredentials};
pub use network::event_bus::{EventCallback, SubscribeError};
pub use network::supervisor::NetworkSupervisor;
pub use network::types::{EventFilter, Interface, LinkEvent, NetworkEvent, NetworkMode, RadioMode};
