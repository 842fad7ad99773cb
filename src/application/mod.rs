//! Application layer - Use cases and application services
//!
//! This layer orchestrates the domain ports to fulfill the gateway's use
//! cases:
//! - Resolving trunk credentials and dispatch decisions per inbound call
//! - Registering for and refusing new participant requests
//! - Running and draining the service

pub mod auth;
pub mod dispatch;
pub mod handler;
pub mod intake;
pub mod service;

pub use auth::AuthResolver;
pub use dispatch::DispatchResolver;
pub use handler::GatewayHandler;
pub use intake::IntakeRegistration;
pub use service::{ServiceController, StopHandle, DEFAULT_DRAIN_POLL_INTERVAL};
