//! Gateway errors

use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The message bus or policy service could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote side answered with an RPC-level error.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Not accepting participants for topic: {0}")]
    NotAccepting(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn transport<E: Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn startup<E: Display>(err: E) -> Self {
        Self::Startup(err.to_string())
    }

    pub fn configuration<E: Display>(err: E) -> Self {
        Self::Configuration(err.to_string())
    }
}
