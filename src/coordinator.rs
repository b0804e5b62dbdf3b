//! Event coordination.
//!
//! Resolves installation identity, stamps it into the session-start event,
//! and dispatches through the injected transport, reporting the outcome
//! back to the orchestrator.

pub mod collaborators;
pub mod session_coordinator;

pub use collaborators::{EventLogger, InstallationIdProvider};
pub use session_coordinator::SessionCoordinator;
