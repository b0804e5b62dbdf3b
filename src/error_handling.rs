//! Error taxonomy for the sessions SDK.
//!
//! All failures are non-fatal and are surfaced through `Result` values,
//! never panics. The top-level `SessionsError` is what reaches the
//! session-start completion callback; the remaining types cover the
//! settings, installations, and transport subsystems.

pub mod types;

pub use types::{
    CacheError, InstallationsError, SessionsError, SettingsError, TransportError,
};
