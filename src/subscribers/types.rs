use std::fmt;

use crate::session_management::types::SessionDetails;

/// Names of the subscriber SDKs that can participate in sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberName {
    Crashlytics,
    Performance,
}

impl fmt::Display for SubscriberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriberName::Crashlytics => write!(f, "crashlytics"),
            SubscriberName::Performance => write!(f, "performance"),
        }
    }
}

/// An in-process component that tags its own telemetry with the session id.
///
/// `is_data_collection_enabled` is queried live, never cached: a subscriber
/// may flip its collection flag at any time and the next gating decision
/// must see the current value. `on_session_changed` is invoked on every
/// rotation regardless of whether a session-start event is ultimately
/// dispatched, and once immediately at registration so a late registrant
/// still learns the current session.
pub trait SessionsSubscriber: Send + Sync {
    fn name(&self) -> SubscriberName;
    fn is_data_collection_enabled(&self) -> bool;
    fn on_session_changed(&self, details: SessionDetails);
}
