//! Call entities

use serde::{Deserialize, Serialize};

/// Routing-relevant attributes of one inbound call.
///
/// Built once by the SIP layer when the INVITE arrives and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Calling number (user part of From)
    pub from_user: String,
    /// Called number (user part of To)
    pub to_user: String,
    /// Called host (host part of To)
    pub to_host: String,
    /// Network address the INVITE came from
    pub src_address: String,
    /// PIN collected from the caller, empty if none was entered
    pub pin: String,
    /// The caller is exempt from PIN prompts
    pub no_pin: bool,
}

impl CallInfo {
    pub fn new(from_user: impl Into<String>, to_user: impl Into<String>) -> Self {
        Self {
            from_user: from_user.into(),
            to_user: to_user.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, to_host: impl Into<String>) -> Self {
        self.to_host = to_host.into();
        self
    }

    pub fn with_src_address(mut self, src_address: impl Into<String>) -> Self {
        self.src_address = src_address.into();
        self
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = pin.into();
        self
    }

    pub fn without_pin(mut self) -> Self {
        self.no_pin = true;
        self
    }

    pub fn has_pin(&self) -> bool {
        !self.pin.is_empty()
    }
}
