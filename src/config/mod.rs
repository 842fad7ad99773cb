//! Configuration management
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `ROOMGATE__*` environment variables
//! (e.g. `ROOMGATE__SERVICE__CLUSTER_ID`).

use crate::application::service::DEFAULT_DRAIN_POLL_INTERVAL;
use crate::domain::shared::error::GatewayError;
use crate::domain::shared::result::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "ROOMGATE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub rpc: RpcConfig,
    pub metrics: MetricsConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Topic under which this instance takes new participant requests
    pub cluster_id: String,
    pub node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Listen address of the intake RPC server
    pub bind_address: SocketAddr,
    /// Base URL of the policy service
    pub policy_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus listener port; disabled when unset
    pub prometheus_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    pub drain_poll_interval_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cluster_id: "default".to_string(),
            node_id: format!("SIP_{}", uuid::Uuid::new_v4().simple()),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 7880)),
            policy_url: "http://127.0.0.1:7881".to_string(),
            request_timeout_ms: 3000,
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_poll_interval_ms: DEFAULT_DRAIN_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl RpcConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl ShutdownConfig {
    pub fn drain_poll_interval(&self) -> Duration {
        Duration::from_millis(self.drain_poll_interval_ms)
    }
}

impl Config {
    /// Load from defaults, the file at `path` if it exists, and the
    /// environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let defaults =
            ::config::Config::try_from(&Config::default()).map_err(GatewayError::configuration)?;

        let settings = ::config::Config::builder()
            .add_source(defaults)
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(GatewayError::configuration)?;

        let config: Config = settings
            .try_deserialize()
            .map_err(GatewayError::configuration)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.cluster_id.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "service.cluster_id must not be empty".to_string(),
            ));
        }
        if self.shutdown.drain_poll_interval_ms == 0 {
            return Err(GatewayError::Configuration(
                "shutdown.drain_poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.rpc.policy_url.is_empty() {
            return Err(GatewayError::Configuration(
                "rpc.policy_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
