//! Client-side session telemetry coordination.
//!
//! The crate tracks the host application's lifecycle, assigns a fresh
//! session identity whenever the app returns from a long enough stay in
//! the background, and dispatches a session-start event through an
//! injected transport — all governed by remotely updatable, locally
//! cached settings and a sampling decision made once per session.
//!
//! [`Sessions`] is the entry point; everything else is wiring behind it.

pub mod app_info;
pub mod coordinator;
pub mod error_handling;
pub mod events;
pub mod session_management;
pub mod sessions;
pub mod settings;
pub mod subscribers;

pub use app_info::{ApplicationInfo, LogEnvironment};
pub use coordinator::{EventLogger, InstallationIdProvider, SessionCoordinator};
pub use error_handling::types::SessionsError;
pub use events::session_start::SessionStartEvent;
pub use session_management::{SessionDetails, SessionGenerator, SessionInfo, SessionInitiator};
pub use sessions::{LoggedEventCallback, Sessions};
pub use settings::SessionsSettings;
pub use subscribers::{SessionsDependencies, SessionsSubscriber, SubscriberName};
