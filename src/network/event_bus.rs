//! Fan-out of semantic connectivity events to other subsystems.

use heapless::Vec;

use super::types::{EventFilter, NetworkEvent};

pub const SUBSCRIBERS_MAX: usize = 16;

/// Subscribers are shared callables, so plain functions and non-capturing
/// closures both register directly. Everything runs on the single scheduler
/// thread; callbacks must be short and must not subscribe from within a
/// dispatch.
pub type EventCallback = &'static (dyn Fn(NetworkEvent) + Sync);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscribeError {
    CapacityExhausted,
}

#[derive(Clone, Copy)]
struct Subscription {
    callback: EventCallback,
    filter: EventFilter,
}

pub struct EventBus {
    subscriptions: Vec<Subscription, SUBSCRIBERS_MAX>,
}

impl EventBus {
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Registers a callback. Duplicate registrations are allowed and each
    /// one fires separately; notification order is insertion order.
    pub fn subscribe(
        &mut self,
        callback: EventCallback,
        filter: EventFilter,
    ) -> Result<(), SubscribeError> {
        self.subscriptions
            .push(Subscription { callback, filter })
            .map_err(|_| SubscribeError::CapacityExhausted)
    }

    /// Synchronously invokes every matching subscriber.
    pub fn publish(&self, event: NetworkEvent) {
        for entry in &self.subscriptions {
            let matches = match entry.filter {
                EventFilter::Any => true,
                EventFilter::Exact(wanted) => wanted == event,
            };
            if matches {
                (entry.callback)(event);
            }
        }
    }
}
