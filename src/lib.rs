//! Roomgate - admission and dispatch control plane of a SIP to WebRTC room
//! gateway
//!
//! For every inbound call the gateway asks an external policy service
//! whether to accept it into a room, demand a PIN, reject it or drop it,
//! and it drains in-flight calls before the process shuts down.
//!
//! The crate is split into layers:
//! - `domain`: call and dispatch types, trunk credentials, lifecycle gate,
//!   and the ports to the policy service and message bus
//! - `application`: dispatch and auth resolution, intake registration and
//!   the service controller
//! - `infrastructure`: JSON-RPC adapters and the in-process call tracker
//! - `interface`: the Prometheus endpoint

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::GatewayError;
pub use domain::shared::result::Result;
