//! Shared kernel - error and result types used by every layer

pub mod error;
pub mod result;

pub use error::GatewayError;
pub use result::Result;
