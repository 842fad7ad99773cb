//! Call bounded context - inbound call attributes and dispatch decisions

pub mod entity;
pub mod handler;
pub mod value_object;

pub use entity::CallInfo;
pub use handler::InboundCallHandler;
pub use value_object::{CallDispatch, DispatchResult, RoomAssignment};
