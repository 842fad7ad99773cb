//! Call value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single dispatch decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchResult {
    /// Route the call into a room
    Accept,
    /// Prompt the caller for a PIN and dispatch again
    RequestPin,
    /// No rule admits the call; answer with a rejection
    RejectNoRule,
    /// No rule admits the call; hang up without answering
    DropNoRule,
}

impl DispatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchResult::Accept => "accept",
            DispatchResult::RequestPin => "request_pin",
            DispatchResult::RejectNoRule => "reject",
            DispatchResult::DropNoRule => "drop",
        }
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an accepted call goes and who it joins as
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAssignment {
    pub room_name: String,
    pub identity: String,
    pub name: String,
    pub metadata: String,
    /// Connection URL of the room service
    pub ws_url: String,
    pub token: String,
    pub trunk_id: String,
    pub dispatch_rule_id: String,
}

/// Dispatch decision handed back to the SIP layer.
///
/// Each variant carries exactly the fields that outcome needs: only
/// `Accept` knows the room, `RequestPin` knows only the trunk, rejections
/// carry nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallDispatch {
    Accept(RoomAssignment),
    RequestPin { trunk_id: String },
    RejectNoRule,
    DropNoRule,
}

impl CallDispatch {
    pub fn result(&self) -> DispatchResult {
        match self {
            CallDispatch::Accept(_) => DispatchResult::Accept,
            CallDispatch::RequestPin { .. } => DispatchResult::RequestPin,
            CallDispatch::RejectNoRule => DispatchResult::RejectNoRule,
            CallDispatch::DropNoRule => DispatchResult::DropNoRule,
        }
    }

    pub fn room(&self) -> Option<&RoomAssignment> {
        match self {
            CallDispatch::Accept(room) => Some(room),
            _ => None,
        }
    }

    pub fn trunk_id(&self) -> Option<&str> {
        match self {
            CallDispatch::Accept(room) => Some(room.trunk_id.as_str()),
            CallDispatch::RequestPin { trunk_id } => Some(trunk_id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_tags() {
        let accept = CallDispatch::Accept(RoomAssignment {
            room_name: "room-a".to_string(),
            trunk_id: "ST_1".to_string(),
            ..Default::default()
        });
        assert_eq!(accept.result(), DispatchResult::Accept);
        assert_eq!(accept.room().map(|r| r.room_name.as_str()), Some("room-a"));
        assert_eq!(accept.trunk_id(), Some("ST_1"));

        let pin = CallDispatch::RequestPin {
            trunk_id: "ST_2".to_string(),
        };
        assert_eq!(pin.result(), DispatchResult::RequestPin);
        assert!(pin.room().is_none());
        assert_eq!(pin.trunk_id(), Some("ST_2"));

        assert_eq!(CallDispatch::RejectNoRule.trunk_id(), None);
        assert_eq!(CallDispatch::DropNoRule.result(), DispatchResult::DropNoRule);
        assert!(CallDispatch::DropNoRule.room().is_none());
    }

    #[test]
    fn test_result_labels() {
        assert_eq!(DispatchResult::RejectNoRule.to_string(), "reject");
        assert_eq!(DispatchResult::RequestPin.as_str(), "request_pin");
    }
}
