//! Domain layer - Core types and ports of the gateway control plane
//!
//! This layer contains:
//! - Value objects for inbound calls and dispatch decisions
//! - Trunk authentication types
//! - Ports (traits) for the policy service, the message bus and the
//!   call-handling subsystem
//! - The service lifecycle state and shutdown gate

pub mod call;
pub mod intake;
pub mod lifecycle;
pub mod policy;
pub mod shared;
pub mod trunk;

// Re-export commonly used types
pub use shared::{GatewayError, Result};
