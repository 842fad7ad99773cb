//! Trunk authentication resolution

use crate::domain::policy::PolicyTransport;
use crate::domain::shared::result::Result;
use crate::domain::trunk::{TrunkAuthRequest, TrunkCredentials};
use metrics::counter;
use std::sync::Arc;
use tracing::debug;

/// Fetches trunk credentials from the policy service.
///
/// Unlike dispatch resolution, transport errors are handed back unchanged:
/// the SIP challenge flow has its own retry policy and decides what to do.
pub struct AuthResolver {
    transport: Arc<dyn PolicyTransport>,
}

impl AuthResolver {
    pub fn new(transport: Arc<dyn PolicyTransport>) -> Self {
        Self { transport }
    }

    pub async fn resolve_credentials(&self, request: TrunkAuthRequest) -> Result<TrunkCredentials> {
        let from = request.from.clone();
        let resp = match self.transport.authenticate_trunk(request).await {
            Ok(resp) => resp,
            Err(e) => {
                counter!("sip_trunk_auth_total", "outcome" => "error").increment(1);
                return Err(e);
            }
        };

        let credentials = TrunkCredentials::from(resp);
        let outcome = if credentials.drop {
            "drop"
        } else if credentials.is_open() {
            "open"
        } else {
            "challenge"
        };
        counter!("sip_trunk_auth_total", "outcome" => outcome).increment(1);
        debug!(from = %from, outcome, "trunk credentials resolved");

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::{AuthenticateTrunkResponse, MockPolicyTransport};
    use crate::domain::GatewayError;

    fn request() -> TrunkAuthRequest {
        TrunkAuthRequest::new("+15550001000", "+15550002000", "sip.example.com", "203.0.113.9")
    }

    #[tokio::test]
    async fn test_returns_credentials() {
        let mut transport = MockPolicyTransport::new();
        transport
            .expect_authenticate_trunk()
            .withf(|req| {
                req.from == "+15550001000"
                    && req.to == "+15550002000"
                    && req.to_host == "sip.example.com"
                    && req.src_address == "203.0.113.9"
            })
            .times(1)
            .returning(|_| {
                Ok(AuthenticateTrunkResponse {
                    username: "trunk-user".to_string(),
                    password: "s3cret".to_string(),
                    drop: false,
                })
            });
        let resolver = AuthResolver::new(Arc::new(transport));

        let creds = resolver.resolve_credentials(request()).await.unwrap();
        assert_eq!(creds, TrunkCredentials::new("trunk-user", "s3cret"));
    }

    #[tokio::test]
    async fn test_drop_instruction() {
        let mut transport = MockPolicyTransport::new();
        transport.expect_authenticate_trunk().returning(|_| {
            Ok(AuthenticateTrunkResponse {
                drop: true,
                ..Default::default()
            })
        });
        let resolver = AuthResolver::new(Arc::new(transport));

        let creds = resolver.resolve_credentials(request()).await.unwrap();
        assert!(creds.drop);
    }

    #[tokio::test]
    async fn test_transport_error_is_returned_unchanged() {
        let mut transport = MockPolicyTransport::new();
        transport
            .expect_authenticate_trunk()
            .times(1)
            .returning(|_| Err(GatewayError::Transport("timed out".to_string())));
        let resolver = AuthResolver::new(Arc::new(transport));

        let err = resolver.resolve_credentials(request()).await.unwrap_err();
        assert_eq!(err, GatewayError::Transport("timed out".to_string()));
    }
}
