//! Injected collaborators of the session coordinator.

use async_trait::async_trait;

use crate::error_handling::types::{InstallationsError, TransportError};
use crate::events::session_start::SessionStartEvent;

/// Resolves the opaque installation identity that ties all telemetry from
/// one install together.
#[async_trait]
pub trait InstallationIdProvider: Send + Sync {
    async fn installation_id(&self) -> Result<String, InstallationsError>;
}

/// Authenticated transport for fully built events. Retry and backoff, if
/// any, are this layer's own business and opaque to the coordinator.
#[async_trait]
pub trait EventLogger: Send + Sync {
    async fn log_event(&self, event: &SessionStartEvent) -> Result<(), TransportError>;
}
