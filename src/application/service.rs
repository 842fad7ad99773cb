//! Service controller
//!
//! Owns the process lifecycle: `Created -> Running -> Draining -> Stopped`.
//! `run` starts the metrics listener, the intake RPC server and the intake
//! registration, then parks until the shutdown gate trips. Shutdown always
//! deregisters intake first; then, unless a kill was requested, it polls
//! the active-call count until it reaches zero, and only then calls the
//! stopper and tears down the listeners.

use super::intake::IntakeRegistration;
use crate::config::Config;
use crate::domain::intake::IntakeBus;
use crate::domain::lifecycle::{ActiveCallCounter, ServiceState, ShutdownGate, Stopper};
use crate::domain::shared::error::GatewayError;
use crate::domain::shared::result::Result;
use crate::interface::api::metrics_handler::{init_metrics, metrics_router};
use metrics::gauge;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default interval between active-call polls while draining
pub const DEFAULT_DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Cloneable handle for requesting shutdown from other tasks
#[derive(Clone)]
pub struct StopHandle {
    gate: Arc<ShutdownGate>,
}

impl StopHandle {
    /// Request shutdown. Only the first request counts; returns whether
    /// this one did.
    pub fn stop(&self, kill: bool) -> bool {
        let won = self.gate.trip(kill);
        if won {
            info!(kill, "shutdown requested");
        } else {
            debug!(kill, "shutdown already requested, ignoring");
        }
        won
    }

    pub fn can_accept(&self) -> bool {
        !self.gate.is_tripped()
    }
}

pub struct ServiceController {
    cluster_id: String,
    prometheus_port: Option<u16>,
    drain_poll_interval: Duration,
    bus: Arc<dyn IntakeBus>,
    stopper: Arc<dyn Stopper>,
    active_calls: Arc<dyn ActiveCallCounter>,
    gate: Arc<ShutdownGate>,
    started: AtomicBool,
    state: watch::Sender<ServiceState>,
}

impl ServiceController {
    pub fn new(
        config: &Config,
        bus: Arc<dyn IntakeBus>,
        stopper: Arc<dyn Stopper>,
        active_calls: Arc<dyn ActiveCallCounter>,
    ) -> Self {
        let (state, _) = watch::channel(ServiceState::Created);
        Self {
            cluster_id: config.service.cluster_id.clone(),
            prometheus_port: config.metrics.prometheus_port,
            drain_poll_interval: config.shutdown.drain_poll_interval(),
            bus,
            stopper,
            active_calls,
            gate: Arc::new(ShutdownGate::new()),
            started: AtomicBool::new(false),
            state,
        }
    }

    pub fn with_drain_poll_interval(mut self, interval: Duration) -> Self {
        self.drain_poll_interval = interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            gate: self.gate.clone(),
        }
    }

    /// Request shutdown; see [`StopHandle::stop`]
    pub fn stop(&self, kill: bool) -> bool {
        self.stop_handle().stop(kill)
    }

    /// False once shutdown has been requested
    pub fn can_accept(&self) -> bool {
        !self.gate.is_tripped()
    }

    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    /// Run the service until shutdown completes.
    ///
    /// Startup failures (metrics listener, RPC server, registration) abort
    /// with an error. Once running, `run` only returns after the stopper
    /// has been called. Only the first call runs; later ones fail.
    pub async fn run(&self) -> Result<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GatewayError::Internal(format!(
                "service already started (state {})",
                self.state()
            )));
        }
        info!(version = env!("CARGO_PKG_VERSION"), "starting service");

        let result = self.serve().await;
        if let Err(e) = &result {
            error!(error = %e, "service failed to start");
        }
        self.set_state(ServiceState::Stopped);
        result
    }

    async fn serve(&self) -> Result<()> {
        let _metrics = match self.prometheus_port {
            Some(port) => Some(MetricsListener::start(port).await?),
            None => None,
        };

        let server = self.bus.start_server().await?;
        let intake = IntakeRegistration::new(server.clone(), self.cluster_id.clone());
        if let Err(e) = intake.register().await {
            server.shutdown().await;
            return Err(e);
        }

        self.set_state(ServiceState::Running);
        info!(cluster_id = %self.cluster_id, "service ready");

        let mode = self.gate.tripped().await;
        info!(mode = ?mode, "shutting down");
        intake.deregister().await;
        self.set_state(ServiceState::Draining);

        if !mode.is_kill() {
            self.drain().await;
        }

        self.stopper.stop().await;
        server.shutdown().await;
        info!("service stopped");
        Ok(())
    }

    async fn drain(&self) {
        loop {
            let active = self.active_calls.active_calls();
            gauge!("sip_drain_active_calls").set(active as f64);
            if active == 0 {
                break;
            }
            info!(active_calls = active, "instance waiting for calls to finish");
            tokio::time::sleep(self.drain_poll_interval).await;
        }
        debug!("all calls finished");
    }

    fn set_state(&self, next: ServiceState) {
        let mut prev = None;
        let changed = self.state.send_if_modified(|state| {
            prev = Some(*state);
            if !state.can_transition_to(next) {
                return false;
            }
            *state = next;
            true
        });
        let Some(prev) = prev else { return };
        if changed {
            debug!(from = %prev, to = %next, "service state changed");
        } else {
            warn!(from = %prev, to = %next, "invalid service state transition ignored");
        }
    }
}

/// Prometheus listener; aborted when dropped
struct MetricsListener {
    task: JoinHandle<()>,
}

impl MetricsListener {
    async fn start(port: u16) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Startup(format!("metrics listener on {}: {}", addr, e)))?;

        let app = metrics_router(init_metrics());
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "metrics listener failed");
            }
        });
        info!(%addr, "metrics listener started");

        Ok(Self { task })
    }
}

impl Drop for MetricsListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
