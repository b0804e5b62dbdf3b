//! Layered settings resolution.
//!
//! `SessionsSettings` merges the three settings sources into one effective
//! view. Resolution order per field: local override, then remote, then SDK
//! default. A field never mixes sources; the first source with an opinion
//! wins. The resolver itself performs no I/O; refreshing the remote layer
//! is an explicit, separate operation.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::error_handling::types::SettingsError;
use crate::settings::providers::{LocalOverrideSettings, SdkDefaultSettings, SettingsProvider};
use crate::settings::remote::RemoteSettings;
use crate::settings::types::{
    DEFAULT_SAMPLING_RATE, DEFAULT_SESSIONS_ENABLED, DEFAULT_SESSION_TIMEOUT,
};

pub struct SessionsSettings {
    local: Arc<LocalOverrideSettings>,
    remote: Arc<RemoteSettings>,
    defaults: SdkDefaultSettings,
}

impl SessionsSettings {
    pub fn new(local: Arc<LocalOverrideSettings>, remote: Arc<RemoteSettings>) -> Self {
        Self {
            local,
            remote,
            defaults: SdkDefaultSettings,
        }
    }

    /// Whether session telemetry collection is enabled at all.
    pub fn sessions_enabled(&self) -> bool {
        self.local
            .sessions_enabled()
            .or_else(|| self.remote.sessions_enabled())
            .or_else(|| self.defaults.sessions_enabled())
            .unwrap_or(DEFAULT_SESSIONS_ENABLED)
    }

    /// Fraction of sessions eligible for event dispatch, in [0, 1].
    pub fn sampling_rate(&self) -> f64 {
        self.local
            .sampling_rate()
            .or_else(|| self.remote.sampling_rate())
            .or_else(|| self.defaults.sampling_rate())
            .unwrap_or(DEFAULT_SAMPLING_RATE)
    }

    /// How long the app may stay backgrounded before the next foreground
    /// starts a new session.
    pub fn session_timeout(&self) -> Duration {
        self.local
            .session_timeout()
            .or_else(|| self.remote.session_timeout())
            .or_else(|| self.defaults.session_timeout())
            .unwrap_or(DEFAULT_SESSION_TIMEOUT)
    }

    /// Refreshes the remote layer if its cache has gone stale. A fetch
    /// failure is reported but leaves resolution unaffected; whatever was
    /// cached keeps being served.
    pub async fn update_settings(&self, current_time: DateTime<Utc>) -> Result<(), SettingsError> {
        self.remote.update_settings(current_time).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_info::{ApplicationInfo, LogEnvironment};
    use crate::settings::cache::{KeyValueStore, MemoryKeyValueStore, SettingsCache};
    use crate::settings::remote::SettingsDownloader;
    use crate::settings::types::SETTINGS_NAMESPACE;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    struct StaticDownloader {
        response: Value,
    }

    #[async_trait]
    impl SettingsDownloader for StaticDownloader {
        async fn fetch(&self) -> Result<Value, SettingsError> {
            Ok(self.response.clone())
        }
    }

    fn sim_app_info() -> ApplicationInfo {
        ApplicationInfo {
            app_id: "test-app-id".to_string(),
            app_build_version: "1".to_string(),
            app_display_version: "1.0.0".to_string(),
            os_name: "linux".to_string(),
            device_model: "generic".to_string(),
            sdk_version: "0.1.0".to_string(),
            log_environment: LogEnvironment::default(),
        }
    }

    fn remote_with(response: Value) -> Arc<RemoteSettings> {
        let store = Arc::new(MemoryKeyValueStore::new()) as Arc<dyn KeyValueStore>;
        let cache = SettingsCache::new(store, SETTINGS_NAMESPACE);
        Arc::new(RemoteSettings::new(
            sim_app_info(),
            Arc::new(StaticDownloader { response }),
            cache,
        ))
    }

    async fn fetched(remote: Arc<RemoteSettings>) -> Arc<RemoteSettings> {
        remote
            .update_settings(Utc.timestamp_opt(1_635_739_200, 0).unwrap())
            .await
            .expect("fetch");
        remote
    }

    #[tokio::test]
    async fn defaults_win_when_no_source_answers() {
        let remote = remote_with(json!({}));
        let settings = SessionsSettings::new(Arc::new(LocalOverrideSettings::new()), remote);

        assert!(settings.sessions_enabled());
        assert_eq!(settings.sampling_rate(), 1.0);
        assert_eq!(settings.session_timeout(), Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn remote_wins_over_defaults() {
        let remote = fetched(remote_with(json!({
            "cache_duration": 10,
            "app_quality": {
                "sessions_enabled": false,
                "sampling_rate": 0.5,
                "session_timeout_seconds": 10
            }
        })))
        .await;
        let settings = SessionsSettings::new(Arc::new(LocalOverrideSettings::new()), remote);

        assert!(!settings.sessions_enabled());
        assert_eq!(settings.sampling_rate(), 0.5);
        assert_eq!(settings.session_timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn local_override_wins_over_remote() {
        let remote = fetched(remote_with(json!({
            "cache_duration": 10,
            "app_quality": { "sessions_enabled": false, "sampling_rate": 0.5 }
        })))
        .await;
        let local = Arc::new(LocalOverrideSettings::new());
        local.set_sessions_enabled(Some(true));
        let settings = SessionsSettings::new(local, remote);

        // Local wins for the overridden key, remote still wins for the rest.
        assert!(settings.sessions_enabled());
        assert_eq!(settings.sampling_rate(), 0.5);
    }

    #[tokio::test]
    async fn fields_resolve_independently() {
        let remote = fetched(remote_with(json!({
            "cache_duration": 10,
            "app_quality": { "session_timeout_seconds": 45 }
        })))
        .await;
        let local = Arc::new(LocalOverrideSettings::new());
        local.set_sampling_rate(Some(0.1));
        let settings = SessionsSettings::new(local, remote);

        assert_eq!(settings.sampling_rate(), 0.1); // local
        assert_eq!(settings.session_timeout(), Duration::from_secs(45)); // remote
        assert!(settings.sessions_enabled()); // default
    }
}
