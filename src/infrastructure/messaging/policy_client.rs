//! JSON-RPC client for the policy service

use crate::domain::policy::{
    AuthenticateTrunkRequest, AuthenticateTrunkResponse, EvaluateDispatchRequest,
    EvaluateDispatchResponse, PolicyTransport,
};
use crate::domain::shared::error::GatewayError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;
use tracing::debug;

pub const AUTHENTICATE_TRUNK_METHOD: &str = "policy.authenticateTrunk";
pub const EVALUATE_DISPATCH_METHOD: &str = "policy.evaluateDispatchRules";

/// [`PolicyTransport`] over JSON-RPC/HTTP. Safe to share between calls.
pub struct RpcPolicyClient {
    client: HttpClient,
    url: String,
}

impl RpcPolicyClient {
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(GatewayError::configuration)?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PolicyTransport for RpcPolicyClient {
    async fn authenticate_trunk(
        &self,
        request: AuthenticateTrunkRequest,
    ) -> Result<AuthenticateTrunkResponse> {
        debug!(url = %self.url, from = %request.from, "authenticating trunk");
        self.client
            .request(AUTHENTICATE_TRUNK_METHOD, rpc_params![request])
            .await
            .map_err(map_client_error)
    }

    async fn evaluate_dispatch(
        &self,
        request: EvaluateDispatchRequest,
    ) -> Result<EvaluateDispatchResponse> {
        debug!(url = %self.url, from = %request.calling_number, "evaluating dispatch rules");
        self.client
            .request(EVALUATE_DISPATCH_METHOD, rpc_params![request])
            .await
            .map_err(map_client_error)
    }
}

fn map_client_error(err: ClientError) -> GatewayError {
    match err {
        ClientError::Call(obj) => GatewayError::Rpc(format!("{} ({})", obj.message(), obj.code())),
        other => GatewayError::transport(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::server::{RpcModule, Server, ServerHandle};
    use jsonrpsee::types::{ErrorObject, ErrorObjectOwned};
    use std::net::SocketAddr;

    async fn policy_server() -> (SocketAddr, ServerHandle) {
        let server = Server::builder().build("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        let mut module = RpcModule::new(());
        module
            .register_method(
                AUTHENTICATE_TRUNK_METHOD,
                |params, _, _| -> std::result::Result<_, ErrorObjectOwned> {
                    let req: AuthenticateTrunkRequest = params.one()?;
                    if req.from == "blocked" {
                        return Err(ErrorObject::owned(
                            -32050,
                            "trunk lookup failed",
                            None::<()>,
                        ));
                    }
                    Ok(AuthenticateTrunkResponse {
                        username: format!("user-{}", req.from),
                        password: "pw".to_string(),
                        drop: false,
                    })
                },
            )
            .unwrap();

        (addr, server.start(module))
    }

    #[tokio::test]
    async fn test_request_round_trip() {
        let (addr, handle) = policy_server().await;
        let client =
            RpcPolicyClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();

        let resp = client
            .authenticate_trunk(AuthenticateTrunkRequest::new("1000", "2000", "h", "a"))
            .await
            .unwrap();
        assert_eq!(resp.username, "user-1000");

        handle.stop().unwrap();
    }

    #[tokio::test]
    async fn test_rpc_error_is_mapped() {
        let (addr, handle) = policy_server().await;
        let client =
            RpcPolicyClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();

        let err = client
            .authenticate_trunk(AuthenticateTrunkRequest::new("blocked", "2000", "h", "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rpc(ref msg) if msg.contains("trunk lookup failed")));

        // Unregistered method is an RPC error as well, not a transport one.
        let err = client
            .evaluate_dispatch(EvaluateDispatchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rpc(_)));

        handle.stop().unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}", port);
        let client = RpcPolicyClient::new(&url, Duration::from_secs(1)).unwrap();

        let err = client
            .evaluate_dispatch(EvaluateDispatchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn test_invalid_url() {
        let err = RpcPolicyClient::new("not a url", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }
}
