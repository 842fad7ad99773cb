//! Interface layer - External interfaces
//!
//! This layer handles:
//! - The Prometheus metrics endpoint

pub mod api;
