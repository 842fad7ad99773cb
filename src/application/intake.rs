//! Intake registration

use crate::domain::intake::IntakeServer;
use crate::domain::shared::result::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Registers this instance for "create SIP participant" requests under a
/// cluster identifier.
///
/// The controller calls `register` once at startup and `deregister` once
/// when shutdown begins. Nothing else should call either.
pub struct IntakeRegistration {
    server: Arc<dyn IntakeServer>,
    cluster_id: String,
}

impl IntakeRegistration {
    pub fn new(server: Arc<dyn IntakeServer>, cluster_id: impl Into<String>) -> Self {
        Self {
            server,
            cluster_id: cluster_id.into(),
        }
    }

    pub async fn register(&self) -> Result<()> {
        self.server
            .register_create_participant_topic(&self.cluster_id)
            .await?;
        debug!(cluster_id = %self.cluster_id, "intake registered");
        Ok(())
    }

    pub async fn deregister(&self) {
        self.server
            .deregister_create_participant_topic(&self.cluster_id)
            .await;
        info!(cluster_id = %self.cluster_id, "intake deregistered, refusing new participants");
    }
}
