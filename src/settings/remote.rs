//! Remotely fetched settings.
//!
//! `RemoteSettings` serves the server-controlled copy of the session
//! settings out of the persisted cache, refreshing it through an injected
//! downloader only when the cache has gone stale. Fetch failures leave the
//! cache untouched: stale values, if any exist, keep being served until a
//! later refresh succeeds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::app_info::ApplicationInfo;
use crate::error_handling::types::SettingsError;
use crate::settings::cache::SettingsCache;
use crate::settings::providers::SettingsProvider;
use crate::settings::types::{
    CacheKey, SAMPLING_RATE_KEY, SESSIONS_ENABLED_KEY, SESSION_TIMEOUT_KEY,
};

/// Injected transport that retrieves the raw settings payload. No retries
/// are assumed at this layer.
#[async_trait]
pub trait SettingsDownloader: Send + Sync {
    async fn fetch(&self) -> Result<Value, SettingsError>;
}

pub struct RemoteSettings {
    app_info: ApplicationInfo,
    downloader: Arc<dyn SettingsDownloader>,
    cache: SettingsCache,
}

impl RemoteSettings {
    pub fn new(
        app_info: ApplicationInfo,
        downloader: Arc<dyn SettingsDownloader>,
        cache: SettingsCache,
    ) -> Self {
        Self {
            app_info,
            downloader,
            cache,
        }
    }

    /// Refreshes the cache if it has gone stale for `current_time`.
    ///
    /// A cache recorded under a different app ID is purged outright before
    /// the fetch: settings fetched for another application must never be
    /// served, not even as stale data. A cache that merely aged out or was
    /// recorded under an older app version stays in place until the fetch
    /// succeeds.
    pub async fn update_settings(&self, current_time: DateTime<Utc>) -> Result<(), SettingsError> {
        if !self.is_cache_expired(current_time) {
            debug!("settings cache still valid; serving cached values");
            return Ok(());
        }

        let payload = match self.downloader.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("settings fetch failed, keeping existing cache: {}", e);
                return Err(e);
            }
        };
        if !payload.is_object() {
            warn!("settings payload is not a map; keeping existing cache");
            return Err(SettingsError::InvalidPayload(
                "payload root is not a map".to_string(),
            ));
        }

        self.cache.update_contents(&payload);
        self.cache.update_metadata(&CacheKey {
            created_at: current_time,
            google_app_id: self.app_info.app_id.clone(),
            app_version: self.app_info.synthesized_version(),
        });
        debug!("settings cache refreshed at {}", current_time);
        Ok(())
    }

    fn is_cache_expired(&self, current_time: DateTime<Utc>) -> bool {
        let key = match self.cache.cache_key() {
            Some(key) => key,
            None => {
                self.cache.remove_cache();
                return true;
            }
        };
        if !self.cache.has_content() {
            self.cache.remove_cache();
            return true;
        }
        if key.google_app_id != self.app_info.app_id {
            debug!("cache expired: app ID changed");
            self.cache.remove_cache();
            return true;
        }
        self.cache.is_expired(&self.app_info, current_time)
    }
}

impl SettingsProvider for RemoteSettings {
    fn sessions_enabled(&self) -> Option<bool> {
        self.cache.namespaced_value(SESSIONS_ENABLED_KEY)
    }

    fn sampling_rate(&self) -> Option<f64> {
        self.cache.namespaced_value(SAMPLING_RATE_KEY)
    }

    fn session_timeout(&self) -> Option<Duration> {
        self.cache
            .namespaced_value::<f64>(SESSION_TIMEOUT_KEY)
            .filter(|secs| *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}
