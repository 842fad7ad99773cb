//! Intake ports - how the message bus learns that this instance takes new
//! "create SIP participant" requests

use crate::domain::shared::result::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to dial out and join the callee to a room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSipParticipantRequest {
    pub sip_trunk_id: String,
    pub sip_call_to: String,
    pub room_name: String,
    pub participant_identity: String,
    pub participant_name: String,
    pub participant_metadata: String,
    pub ws_url: String,
    pub token: String,
    /// DTMF digits to send once the call connects
    pub dtmf: String,
    pub play_ringtone: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSipParticipantResponse {
    pub participant_id: String,
    pub participant_identity: String,
    pub sip_call_id: String,
}

/// Serves "create SIP participant" requests. Implemented by the SIP layer.
#[async_trait]
pub trait CreateParticipantHandler: Send + Sync {
    async fn create_sip_participant(
        &self,
        request: CreateSipParticipantRequest,
    ) -> Result<CreateSipParticipantResponse>;
}

/// RPC server bound to the message bus.
///
/// Requests for a topic only reach this instance while the topic is
/// registered.
#[async_trait]
pub trait IntakeServer: Send + Sync {
    async fn register_create_participant_topic(&self, topic: &str) -> Result<()>;

    async fn deregister_create_participant_topic(&self, topic: &str);

    /// Stop serving and release the listener
    async fn shutdown(&self);
}

/// Builds the RPC server. Failure here is fatal to startup.
#[async_trait]
pub trait IntakeBus: Send + Sync {
    async fn start_server(&self) -> Result<Arc<dyn IntakeServer>>;
}
