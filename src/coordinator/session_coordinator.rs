//! Session-start event dispatch.

use log::debug;
use std::sync::Arc;

use crate::coordinator::collaborators::{EventLogger, InstallationIdProvider};
use crate::error_handling::types::SessionsError;
use crate::events::session_start::SessionStartEvent;

/// Stamps the installation identity into a session-start event and hands
/// it to the injected logger. Performs no retries of its own; the logger's
/// verdict is forwarded verbatim.
pub struct SessionCoordinator {
    installations: Arc<dyn InstallationIdProvider>,
    logger: Arc<dyn EventLogger>,
}

impl SessionCoordinator {
    pub fn new(
        installations: Arc<dyn InstallationIdProvider>,
        logger: Arc<dyn EventLogger>,
    ) -> Self {
        Self {
            installations,
            logger,
        }
    }

    /// Resolves the installation id, stamps it, and submits the event.
    /// When resolution fails the event is never submitted.
    pub async fn attempt_logging_session_start(
        &self,
        mut event: SessionStartEvent,
    ) -> Result<(), SessionsError> {
        let installation_id = self
            .installations
            .installation_id()
            .await
            .map_err(SessionsError::SessionInstallations)?;

        event.set_installation_id(installation_id);
        debug!(
            "submitting session-start event for session {}",
            event.session_data.session_id
        );

        self.logger
            .log_event(&event)
            .await
            .map_err(SessionsError::DataTransport)
    }
}
