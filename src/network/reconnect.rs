//! Station search suspension during the admin-AP window.
//!
//! An actively scanning station radio starves the AP of airtime, so after a
//! grace period without connectivity the search is paused, and after a
//! cooldown it resumes. This bounds both directions: the AP is never
//! starved longer than the connect timeout, and the search is never parked
//! longer than the redo timeout.

/// Seconds of unsuccessful searching tolerated before the station radio is
/// parked so AP clients get airtime.
pub(crate) const CONNECT_TIMEOUT_S: u32 = 15;

/// Seconds parked before the search resumes.
pub(crate) const REDO_TIMEOUT_S: u32 = 600;

/// Radio change the supervisor has to apply after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchAction {
    None,
    /// Drop to AP-only, station scanning off.
    Suspend,
    /// Back to AP + station, re-apply the station configuration.
    Resume,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ReconnectSupervisor {
    seconds_since_connected: u32,
    seconds_since_suspended: u32,
    search_suspended: bool,
}

impl ReconnectSupervisor {
    pub(crate) const fn new() -> Self {
        Self {
            seconds_since_connected: 0,
            seconds_since_suspended: 0,
            search_suspended: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn search_suspended(&self) -> bool {
        self.search_suspended
    }

    pub(crate) fn tick(&mut self, connected: bool, ap_enabled: bool, elapsed_s: u32) -> SearchAction {
        if !ap_enabled {
            return SearchAction::None;
        }
        if connected {
            self.seconds_since_connected = 0;
            self.seconds_since_suspended = 0;
            self.search_suspended = false;
            return SearchAction::None;
        }
        if !self.search_suspended {
            self.seconds_since_connected = self.seconds_since_connected.saturating_add(elapsed_s);
            if self.seconds_since_connected > CONNECT_TIMEOUT_S {
                self.search_suspended = true;
                self.seconds_since_suspended = 0;
                return SearchAction::Suspend;
            }
        } else {
            self.seconds_since_suspended = self.seconds_since_suspended.saturating_add(elapsed_s);
            if self.seconds_since_suspended > REDO_TIMEOUT_S {
                self.search_suspended = false;
                self.seconds_since_connected = 0;
                return SearchAction::Resume;
            }
        }
        SearchAction::None
    }
}
