//! Message-bus adapters - JSON-RPC client for the policy service and the
//! intake server for participant requests

pub mod intake_server;
pub mod policy_client;

pub use intake_server::{
    CreateParticipantParams, JsonRpcIntakeBus, JsonRpcIntakeServer, CREATE_PARTICIPANT_METHOD,
    HANDLER_ERROR_CODE, NOT_ACCEPTING_CODE,
};
pub use policy_client::{RpcPolicyClient, AUTHENTICATE_TRUNK_METHOD, EVALUATE_DISPATCH_METHOD};
