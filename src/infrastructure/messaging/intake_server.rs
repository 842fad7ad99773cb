//! JSON-RPC intake server
//!
//! Serves `sip.createParticipant` on the bus. Each request names the topic
//! (cluster identifier) it was routed under; requests for a topic that is
//! not currently registered are refused with [`NOT_ACCEPTING_CODE`] so the
//! bus can route them to another instance.

use crate::domain::intake::{
    CreateParticipantHandler, CreateSipParticipantRequest, CreateSipParticipantResponse,
    IntakeBus, IntakeServer,
};
use crate::domain::shared::error::GatewayError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use jsonrpsee::server::{RpcModule, Server, ServerHandle};
use jsonrpsee::types::{ErrorObject, ErrorObjectOwned, Params};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const CREATE_PARTICIPANT_METHOD: &str = "sip.createParticipant";

/// The topic is not registered on this instance
pub const NOT_ACCEPTING_CODE: i32 = -32001;
/// The participant handler failed
pub const HANDLER_ERROR_CODE: i32 = -32000;

/// Params of [`CREATE_PARTICIPANT_METHOD`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateParticipantParams {
    pub topic: String,
    pub request: CreateSipParticipantRequest,
}

struct IntakeContext {
    topics: Arc<RwLock<HashSet<String>>>,
    handler: Arc<dyn CreateParticipantHandler>,
}

impl IntakeContext {
    async fn create_participant(
        &self,
        params: Params<'static>,
    ) -> std::result::Result<CreateSipParticipantResponse, ErrorObjectOwned> {
        let CreateParticipantParams { topic, request } = params.one()?;

        if !self.topics.read().await.contains(&topic) {
            debug!(%topic, "refusing participant, topic not registered");
            return Err(ErrorObject::owned(
                NOT_ACCEPTING_CODE,
                GatewayError::NotAccepting(topic).to_string(),
                None::<()>,
            ));
        }

        self.handler
            .create_sip_participant(request)
            .await
            .map_err(|e| {
                warn!(%topic, error = %e, "create participant failed");
                ErrorObject::owned(HANDLER_ERROR_CODE, e.to_string(), None::<()>)
            })
    }
}

/// Starts [`JsonRpcIntakeServer`]s on a fixed bind address
pub struct JsonRpcIntakeBus {
    bind_address: SocketAddr,
    handler: Arc<dyn CreateParticipantHandler>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl JsonRpcIntakeBus {
    pub fn new(bind_address: SocketAddr, handler: Arc<dyn CreateParticipantHandler>) -> Self {
        Self {
            bind_address,
            handler,
            local_addr: Mutex::new(None),
        }
    }

    /// Address the last started server is listening on
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.lock().ok().and_then(|addr| *addr)
    }
}

#[async_trait]
impl IntakeBus for JsonRpcIntakeBus {
    async fn start_server(&self) -> Result<Arc<dyn IntakeServer>> {
        let server = Server::builder()
            .build(self.bind_address)
            .await
            .map_err(|e| {
                GatewayError::Startup(format!("rpc server on {}: {}", self.bind_address, e))
            })?;
        let local_addr = server.local_addr().map_err(GatewayError::startup)?;

        let topics = Arc::new(RwLock::new(HashSet::new()));
        let mut module = RpcModule::new(IntakeContext {
            topics: topics.clone(),
            handler: self.handler.clone(),
        });
        module
            .register_async_method(CREATE_PARTICIPANT_METHOD, |params, ctx, _| async move {
                ctx.create_participant(params).await
            })
            .map_err(GatewayError::startup)?;

        let handle = server.start(module);
        if let Ok(mut addr) = self.local_addr.lock() {
            *addr = Some(local_addr);
        }
        info!(%local_addr, "rpc server started");

        Ok(Arc::new(JsonRpcIntakeServer {
            handle,
            local_addr,
            topics,
        }))
    }
}

pub struct JsonRpcIntakeServer {
    handle: ServerHandle,
    local_addr: SocketAddr,
    topics: Arc<RwLock<HashSet<String>>>,
}

impl JsonRpcIntakeServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl IntakeServer for JsonRpcIntakeServer {
    async fn register_create_participant_topic(&self, topic: &str) -> Result<()> {
        let mut topics = self.topics.write().await;
        if !topics.insert(topic.to_string()) {
            return Err(GatewayError::Rpc(format!(
                "topic {} already registered",
                topic
            )));
        }
        Ok(())
    }

    async fn deregister_create_participant_topic(&self, topic: &str) {
        if !self.topics.write().await.remove(topic) {
            debug!(%topic, "topic was not registered");
        }
    }

    async fn shutdown(&self) {
        if self.handle.stop().is_ok() {
            self.handle.clone().stopped().await;
            info!(local_addr = %self.local_addr, "rpc server stopped");
        }
    }
}
