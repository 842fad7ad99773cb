//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - JSON-RPC adapters for the policy service and the intake bus
//! - The in-process call tracker

pub mod calls;
pub mod messaging;
