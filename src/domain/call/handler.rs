//! Inbound call handler port

use super::entity::CallInfo;
use super::value_object::CallDispatch;
use crate::domain::shared::result::Result;
use crate::domain::trunk::{TrunkAuthRequest, TrunkCredentials};
use async_trait::async_trait;

/// What the SIP layer asks of the control plane for every inbound call.
///
/// Implemented in the application layer; the SIP transaction layer holds
/// it as `Arc<dyn InboundCallHandler>`.
#[async_trait]
pub trait InboundCallHandler: Send + Sync {
    /// Look up digest credentials for the trunk the call arrived on.
    async fn get_auth_credentials(&self, request: TrunkAuthRequest) -> Result<TrunkCredentials>;

    /// Decide where the call goes. Never fails; errors degrade to a rejection.
    async fn dispatch_call(&self, info: &CallInfo) -> CallDispatch;

    /// False once shutdown has begun.
    fn can_accept(&self) -> bool;
}
