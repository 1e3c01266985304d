/// Transport currently carrying the device's upstream traffic.
///
/// `Undefined` only exists between construction and the first tick; the
/// supervisor converges to one of the other two on its first dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkMode {
    Undefined,
    WifiStation,
    Ethernet,
}

/// Physical interface a driver query or command targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interface {
    Station,
    Wired,
}

/// Radio states the driver can be commanded into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioMode {
    Off,
    Station,
    AccessPoint,
    ApStation,
}

/// Discrete notifications raised by the interface drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    WiredStart,
    WiredStop,
    WiredConnected,
    WiredGotIp,
    WiredDisconnected,
    StationConnected,
    /// Reason codes are driver-defined; they are logged, never interpreted.
    StationDisconnected { reason: u8 },
    StationGotIp,
}

/// Semantic connectivity events fanned out to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    Start,
    Stop,
    Connected,
    GotIp,
    Disconnected,
}

/// Which published events a subscription wants to see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    Exact(NetworkEvent),
    Any,
}
