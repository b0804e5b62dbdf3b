use serde::{Deserialize, Serialize};

/// Identity of one session, created on every rotation and immutable
/// afterwards. The next rotation supersedes it, carrying this session's id
/// forward as `previous_session_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// 32-character lowercase hex identifier, no separators.
    pub session_id: String,
    /// Id of the session this one replaced; `None` for the cold-start
    /// session.
    pub previous_session_id: Option<String>,
    /// Sampling verdict computed at rotation time.
    pub should_dispatch_events: bool,
    /// 0 for the cold-start session, incremented on every rotation.
    pub session_index: u64,
}

/// Read-only snapshot handed to subscribers and exposed through the public
/// surface. `session_id` is `None` only before the first rotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionDetails {
    pub session_id: Option<String>,
}
