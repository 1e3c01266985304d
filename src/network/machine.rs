//! Mode arbitration state machine.
//!
//! The wired link always wins: while it is up the device runs in ethernet
//! mode with the radio fully off, otherwise it runs as a wifi station. The
//! machine only decides the switch; the supervisor applies the driver side
//! effects it reports back.

use statig::blocking::IntoStateMachineExt as _;
use statig::prelude::*;

use super::types::NetworkMode;

/// Link snapshot fed to the machine on every tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LinkSnapshot {
    pub(crate) ethernet_link_up: bool,
}

/// Switch decided by a dispatch; `None` when the mode already matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum ModeSwitch {
    #[default]
    None,
    ToEthernet,
    ToWifiStation,
}

#[derive(Default)]
pub(crate) struct SwitchContext {
    switch: ModeSwitch,
}

pub(crate) struct ModeMachine {
    mode: NetworkMode,
}

#[state_machine(initial = "State::undefined()")]
impl ModeMachine {
    #[state]
    fn undefined(
        &mut self,
        context: &mut SwitchContext,
        event: &LinkSnapshot,
    ) -> Outcome<State> {
        if event.ethernet_link_up {
            self.mode = NetworkMode::Ethernet;
            context.switch = ModeSwitch::ToEthernet;
            Transition(State::ethernet())
        } else {
            self.mode = NetworkMode::WifiStation;
            context.switch = ModeSwitch::ToWifiStation;
            Transition(State::wifi_station())
        }
    }

    #[state]
    fn wifi_station(
        &mut self,
        context: &mut SwitchContext,
        event: &LinkSnapshot,
    ) -> Outcome<State> {
        if event.ethernet_link_up {
            self.mode = NetworkMode::Ethernet;
            context.switch = ModeSwitch::ToEthernet;
            Transition(State::ethernet())
        } else {
            Handled
        }
    }

    #[state]
    fn ethernet(
        &mut self,
        context: &mut SwitchContext,
        event: &LinkSnapshot,
    ) -> Outcome<State> {
        if event.ethernet_link_up {
            Handled
        } else {
            self.mode = NetworkMode::WifiStation;
            context.switch = ModeSwitch::ToWifiStation;
            Transition(State::wifi_station())
        }
    }
}

pub(crate) struct ModeEngine {
    machine: statig::blocking::StateMachine<ModeMachine>,
}

impl ModeEngine {
    pub(crate) fn new() -> Self {
        Self {
            machine: ModeMachine {
                mode: NetworkMode::Undefined,
            }
            .state_machine(),
        }
    }

    pub(crate) fn mode(&self) -> NetworkMode {
        self.machine.inner().mode
    }

    /// Dispatches one arbitration step and reports the switch to apply.
    pub(crate) fn evaluate(&mut self, ethernet_link_up: bool) -> ModeSwitch {
        let mut context = SwitchContext::default();
        self.machine
            .handle_with_context(&LinkSnapshot { ethernet_link_up }, &mut context);
        context.switch
    }
}
