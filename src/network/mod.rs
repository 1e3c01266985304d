//! Network interface mode supervision.
//!
//! The device carries two mutually exclusive upstream transports, wired
//! ethernet and a wifi station association, plus a local admin access point
//! used when neither is reachable. Everything in this module runs on the
//! single cooperative scheduler thread: the driver layer reports discrete
//! link events, and a periodic non-blocking tick arbitrates which interface
//! is active and keeps the admin AP usable.

pub(crate) mod admin_ap;
pub mod config;
pub mod driver;
pub mod event_bus;
pub mod hostname;
pub(crate) mod machine;
pub(crate) mod reconnect;
pub mod supervisor;
pub mod types;
