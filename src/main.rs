use async_trait::async_trait;
use roomgate::application::{GatewayHandler, ServiceController, StopHandle};
use roomgate::config::Config;
use roomgate::domain::call::InboundCallHandler;
use roomgate::domain::intake::{
    CreateParticipantHandler, CreateSipParticipantRequest, CreateSipParticipantResponse,
};
use roomgate::infrastructure::calls::CallTracker;
use roomgate::infrastructure::messaging::{JsonRpcIntakeBus, RpcPolicyClient};
use roomgate::GatewayError;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "roomgate.toml";

/// Refuses outbound participants; no SIP stack is attached to this binary.
struct NoOutbound;

#[async_trait]
impl CreateParticipantHandler for NoOutbound {
    async fn create_sip_participant(
        &self,
        request: CreateSipParticipantRequest,
    ) -> roomgate::Result<CreateSipParticipantResponse> {
        warn!(
            to = %request.sip_call_to,
            room = %request.room_name,
            "outbound call requested but no SIP stack is attached"
        );
        Err(GatewayError::Internal(
            "outbound calls are not available on this node".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path =
        std::env::var("ROOMGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    info!(
        path = %config_path,
        cluster_id = %config.service.cluster_id,
        node_id = %config.service.node_id,
        "configuration loaded"
    );

    let policy = Arc::new(RpcPolicyClient::new(
        &config.rpc.policy_url,
        config.rpc.request_timeout(),
    )?);
    let calls = CallTracker::new();
    let bus = Arc::new(JsonRpcIntakeBus::new(
        config.rpc.bind_address,
        Arc::new(NoOutbound),
    ));

    let controller = ServiceController::new(&config, bus, calls.clone(), calls.clone());

    // The SIP transaction layer takes this handler for inbound calls.
    let handler: Arc<dyn InboundCallHandler> =
        Arc::new(GatewayHandler::new(policy, controller.stop_handle()));
    info!(accepting = handler.can_accept(), "inbound call handler ready");

    tokio::spawn(watch_signals(controller.stop_handle()));

    controller.run().await?;
    info!("roomgate exited cleanly");
    Ok(())
}

/// SIGTERM drains; SIGINT and SIGQUIT kill.
#[cfg(unix)]
async fn watch_signals(stop: StopHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut term, mut quit) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    ) {
        (Ok(term), Ok(quit)) => (term, quit),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "failed to install signal handlers");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = term.recv() => {
                info!("received SIGTERM, draining");
                stop.stop(false);
            }
            _ = quit.recv() => {
                info!("received SIGQUIT, killing");
                stop.stop(true);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT, killing");
                stop.stop(true);
            }
        }
    }
}

#[cfg(not(unix))]
async fn watch_signals(stop: StopHandle) {
    loop {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("received interrupt, killing");
        stop.stop(true);
    }
}
