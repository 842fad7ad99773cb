/// SIP trunk authentication types
use serde::{Deserialize, Serialize};

/// Identifies the trunk an inbound call arrived on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrunkAuthRequest {
    /// Calling number
    pub from: String,
    /// Called number
    pub to: String,
    /// Called host
    pub to_host: String,
    /// Source address of the INVITE
    pub src_address: String,
}

impl TrunkAuthRequest {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        to_host: impl Into<String>,
        src_address: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            to_host: to_host.into(),
            src_address: src_address.into(),
        }
    }
}

/// Credentials for challenging an inbound call.
///
/// `drop` is not an authentication failure: it tells the SIP layer to end
/// the call silently, without any auth-failure response that would reveal
/// the endpoint exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrunkCredentials {
    pub username: String,
    pub password: String,
    pub drop: bool,
}

impl TrunkCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            drop: false,
        }
    }

    /// No credentials configured; the call needs no digest challenge
    pub fn is_open(&self) -> bool {
        !self.drop && self.username.is_empty() && self.password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_is_distinct_from_credentials() {
        let creds = TrunkCredentials {
            drop: true,
            ..Default::default()
        };
        assert!(creds.drop);
        assert!(!creds.is_open());

        let creds = TrunkCredentials::new("trunk-user", "s3cret");
        assert!(!creds.drop);
        assert!(!creds.is_open());

        assert!(TrunkCredentials::default().is_open());
    }
}
