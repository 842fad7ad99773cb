//! Policy service port
//!
//! The policy service owns trunk authentication and dispatch rules. This
//! module defines the two RPCs the gateway makes against it and their
//! messages; the transport behind them lives in the infrastructure layer.

use crate::domain::call::CallInfo;
use crate::domain::shared::result::Result;
use crate::domain::trunk::{TrunkAuthRequest, TrunkCredentials};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result codes the policy service answers a dispatch evaluation with.
///
/// Codes travel as plain integers so that a code added by a newer policy
/// service still decodes and can be handled explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DispatchResultCode {
    /// Accept, or request a PIN when `request_pin` is set. Predates the
    /// explicit accept/PIN split.
    LegacyAcceptOrPin = 0,
    Accept = 1,
    RequestPin = 2,
    Reject = 3,
    Drop = 4,
}

impl DispatchResultCode {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::LegacyAcceptOrPin),
            1 => Some(Self::Accept),
            2 => Some(Self::RequestPin),
            3 => Some(Self::Reject),
            4 => Some(Self::Drop),
            _ => None,
        }
    }
}

impl From<DispatchResultCode> for i32 {
    fn from(code: DispatchResultCode) -> Self {
        code as i32
    }
}

pub type AuthenticateTrunkRequest = TrunkAuthRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticateTrunkResponse {
    pub username: String,
    pub password: String,
    pub drop: bool,
}

impl From<AuthenticateTrunkResponse> for TrunkCredentials {
    fn from(resp: AuthenticateTrunkResponse) -> Self {
        TrunkCredentials {
            username: resp.username,
            password: resp.password,
            drop: resp.drop,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateDispatchRequest {
    pub calling_number: String,
    pub called_number: String,
    pub called_host: String,
    pub src_address: String,
    pub pin: String,
    pub no_pin: bool,
}

impl From<&CallInfo> for EvaluateDispatchRequest {
    fn from(info: &CallInfo) -> Self {
        Self {
            calling_number: info.from_user.clone(),
            called_number: info.to_user.clone(),
            called_host: info.to_host.clone(),
            src_address: info.src_address.clone(),
            pin: info.pin.clone(),
            no_pin: info.no_pin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateDispatchResponse {
    /// Raw [`DispatchResultCode`]
    pub result: i32,
    /// Only meaningful with [`DispatchResultCode::LegacyAcceptOrPin`]
    pub request_pin: bool,
    pub room_name: String,
    pub participant_identity: String,
    pub participant_name: String,
    pub participant_metadata: String,
    pub ws_url: String,
    pub token: String,
    pub sip_trunk_id: String,
    pub sip_dispatch_rule_id: String,
}

impl EvaluateDispatchResponse {
    pub fn with_code(code: DispatchResultCode) -> Self {
        Self {
            result: code.into(),
            ..Default::default()
        }
    }

    pub fn code(&self) -> Option<DispatchResultCode> {
        DispatchResultCode::from_i32(self.result)
    }
}

/// RPC client for the policy service.
///
/// Implementations must be safe to share across concurrent calls.
/// Cancellation and deadlines belong to the caller: dropping the returned
/// future abandons the request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicyTransport: Send + Sync {
    async fn authenticate_trunk(
        &self,
        request: AuthenticateTrunkRequest,
    ) -> Result<AuthenticateTrunkResponse>;

    async fn evaluate_dispatch(
        &self,
        request: EvaluateDispatchRequest,
    ) -> Result<EvaluateDispatchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes() {
        for code in [
            DispatchResultCode::LegacyAcceptOrPin,
            DispatchResultCode::Accept,
            DispatchResultCode::RequestPin,
            DispatchResultCode::Reject,
            DispatchResultCode::Drop,
        ] {
            assert_eq!(DispatchResultCode::from_i32(code.into()), Some(code));
        }
        assert_eq!(DispatchResultCode::from_i32(5), None);
        assert_eq!(DispatchResultCode::from_i32(-1), None);
    }

    #[test]
    fn test_request_from_call_info() {
        let info = CallInfo::new("1000", "2000")
            .with_host("sip.example.com")
            .with_src_address("192.0.2.10")
            .with_pin("9876");
        let req = EvaluateDispatchRequest::from(&info);

        assert_eq!(req.calling_number, "1000");
        assert_eq!(req.called_number, "2000");
        assert_eq!(req.called_host, "sip.example.com");
        assert_eq!(req.src_address, "192.0.2.10");
        assert_eq!(req.pin, "9876");
        assert!(!req.no_pin);
    }

    #[test]
    fn test_response_decodes_with_missing_fields() {
        let resp: EvaluateDispatchResponse =
            serde_json::from_str(r#"{"result": 7, "room_name": "room-z"}"#).unwrap();
        assert_eq!(resp.code(), None);
        assert_eq!(resp.room_name, "room-z");
        assert!(resp.token.is_empty());
    }
}
