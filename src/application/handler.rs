//! Gateway handler - the facade the SIP layer calls for every inbound call

use super::auth::AuthResolver;
use super::dispatch::DispatchResolver;
use super::service::StopHandle;
use crate::domain::call::{CallDispatch, CallInfo, InboundCallHandler};
use crate::domain::policy::PolicyTransport;
use crate::domain::shared::result::Result;
use crate::domain::trunk::{TrunkAuthRequest, TrunkCredentials};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GatewayHandler {
    auth: AuthResolver,
    dispatch: DispatchResolver,
    stop: StopHandle,
}

impl GatewayHandler {
    pub fn new(transport: Arc<dyn PolicyTransport>, stop: StopHandle) -> Self {
        Self {
            auth: AuthResolver::new(transport.clone()),
            dispatch: DispatchResolver::new(transport),
            stop,
        }
    }
}

#[async_trait]
impl InboundCallHandler for GatewayHandler {
    async fn get_auth_credentials(&self, request: TrunkAuthRequest) -> Result<TrunkCredentials> {
        self.auth.resolve_credentials(request).await
    }

    async fn dispatch_call(&self, info: &CallInfo) -> CallDispatch {
        self.dispatch.resolve(info).await
    }

    fn can_accept(&self) -> bool {
        self.stop.can_accept()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::service::ServiceController;
    use crate::config::Config;
    use crate::domain::intake::{IntakeBus, IntakeServer};
    use crate::domain::lifecycle::MockStopper;
    use crate::domain::policy::{
        AuthenticateTrunkResponse, DispatchResultCode, EvaluateDispatchResponse,
        MockPolicyTransport,
    };
    use crate::domain::GatewayError;

    struct NoBus;

    #[async_trait]
    impl IntakeBus for NoBus {
        async fn start_server(&self) -> Result<Arc<dyn IntakeServer>> {
            Err(GatewayError::Startup("not used".to_string()))
        }
    }

    fn controller() -> ServiceController {
        ServiceController::new(
            &Config::default(),
            Arc::new(NoBus),
            Arc::new(MockStopper::new()),
            Arc::new(|| 0usize),
        )
    }

    #[tokio::test]
    async fn test_delegates_to_resolvers() {
        let mut transport = MockPolicyTransport::new();
        transport.expect_authenticate_trunk().times(1).returning(|_| {
            Ok(AuthenticateTrunkResponse {
                username: "u".to_string(),
                password: "p".to_string(),
                drop: false,
            })
        });
        transport
            .expect_evaluate_dispatch()
            .times(1)
            .returning(|_| Ok(EvaluateDispatchResponse::with_code(DispatchResultCode::Drop)));

        let controller = controller();
        let handler = GatewayHandler::new(Arc::new(transport), controller.stop_handle());

        let creds = handler
            .get_auth_credentials(TrunkAuthRequest::new("1000", "2000", "", ""))
            .await
            .unwrap();
        assert_eq!(creds, TrunkCredentials::new("u", "p"));

        let dispatch = handler.dispatch_call(&CallInfo::new("1000", "2000")).await;
        assert_eq!(dispatch, CallDispatch::DropNoRule);
    }

    #[test]
    fn test_refuses_calls_after_stop() {
        let controller = controller();
        let handler =
            GatewayHandler::new(Arc::new(MockPolicyTransport::new()), controller.stop_handle());

        assert!(handler.can_accept());
        controller.stop(false);
        assert!(!handler.can_accept());
    }
}
