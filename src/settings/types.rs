use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root-level key carrying the cache TTL in seconds.
pub const CACHE_DURATION_KEY: &str = "cache_duration";
/// Namespace map holding the sessions-specific settings.
pub const SETTINGS_NAMESPACE: &str = "app_quality";

pub const SESSIONS_ENABLED_KEY: &str = "sessions_enabled";
pub const SAMPLING_RATE_KEY: &str = "sampling_rate";
pub const SESSION_TIMEOUT_KEY: &str = "session_timeout_seconds";

/// TTL applied when the cached payload does not declare one.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_SESSIONS_ENABLED: bool = true;
pub const DEFAULT_SAMPLING_RATE: f64 = 1.0;
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Metadata written alongside freshly fetched settings.
///
/// A cache entry is only valid while `google_app_id` and `app_version`
/// match the running application and the elapsed time since `created_at`
/// is below the declared cache duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheKey {
    pub created_at: DateTime<Utc>,
    pub google_app_id: String,
    pub app_version: String,
}
