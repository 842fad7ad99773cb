//! Dispatch resolution
//!
//! Turns a policy-service dispatch evaluation into a [`CallDispatch`].
//! Resolution is fail-closed: a transport failure or an unknown result code
//! rejects the call. Nothing is retried, because call setup cannot wait for
//! a second round trip.

use crate::domain::call::{CallDispatch, CallInfo, DispatchResult, RoomAssignment};
use crate::domain::policy::{
    DispatchResultCode, EvaluateDispatchRequest, EvaluateDispatchResponse, PolicyTransport,
};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct DispatchResolver {
    transport: Arc<dyn PolicyTransport>,
}

impl DispatchResolver {
    pub fn new(transport: Arc<dyn PolicyTransport>) -> Self {
        Self { transport }
    }

    /// Resolve the dispatch decision for one inbound call
    pub async fn resolve(&self, info: &CallInfo) -> CallDispatch {
        let request = EvaluateDispatchRequest::from(info);

        let resp = match self.transport.evaluate_dispatch(request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    from = %info.from_user,
                    to = %info.to_user,
                    error = %e,
                    "SIP handle dispatch rule error"
                );
                counter!("sip_dispatch_errors_total", "kind" => "transport").increment(1);
                return Self::finish(CallDispatch::RejectNoRule);
            }
        };

        let dispatch = match resp.code() {
            Some(DispatchResultCode::LegacyAcceptOrPin) => {
                if resp.request_pin {
                    CallDispatch::RequestPin {
                        trunk_id: resp.sip_trunk_id,
                    }
                } else {
                    // TODO: drop once no policy service answers with the legacy code
                    CallDispatch::Accept(room_assignment(resp))
                }
            }
            Some(DispatchResultCode::Accept) => CallDispatch::Accept(room_assignment(resp)),
            Some(DispatchResultCode::RequestPin) => CallDispatch::RequestPin {
                trunk_id: resp.sip_trunk_id,
            },
            Some(DispatchResultCode::Reject) => CallDispatch::RejectNoRule,
            Some(DispatchResultCode::Drop) => CallDispatch::DropNoRule,
            None => {
                error!(
                    result = resp.result,
                    "SIP handle dispatch rule error: unexpected dispatch result"
                );
                counter!("sip_dispatch_errors_total", "kind" => "unknown_result").increment(1);
                CallDispatch::RejectNoRule
            }
        };

        debug!(
            from = %info.from_user,
            to = %info.to_user,
            pin = info.has_pin(),
            result = %dispatch.result(),
            "dispatch resolved"
        );
        Self::finish(dispatch)
    }

    fn finish(dispatch: CallDispatch) -> CallDispatch {
        let result: DispatchResult = dispatch.result();
        counter!("sip_dispatch_total", "result" => result.as_str()).increment(1);
        dispatch
    }
}

fn room_assignment(resp: EvaluateDispatchResponse) -> RoomAssignment {
    RoomAssignment {
        room_name: resp.room_name,
        identity: resp.participant_identity,
        name: resp.participant_name,
        metadata: resp.participant_metadata,
        ws_url: resp.ws_url,
        token: resp.token,
        trunk_id: resp.sip_trunk_id,
        dispatch_rule_id: resp.sip_dispatch_rule_id,
    }
}
