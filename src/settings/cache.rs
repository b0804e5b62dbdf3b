//! Persisted settings cache.
//!
//! The cache is split in two layers. `KeyValueStore` is the injected
//! persistence backend: an untyped string-blob store with no knowledge of
//! settings at all. `SettingsCache` sits on top and adds namespacing,
//! type-checked projections, metadata bookkeeping, and the staleness check.
//!
//! Corrupted or foreign-shaped persisted data is always read as absent,
//! never as an error: a client that wrote garbage into the backing store
//! must behave exactly like a client with no cache at all.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use crate::app_info::ApplicationInfo;
use crate::error_handling::types::CacheError;
use crate::settings::types::{CacheKey, CACHE_DURATION_KEY, DEFAULT_CACHE_DURATION};

/// Storage key for the settings blob itself.
pub const SETTINGS_CONTENT_KEY: &str = "sessions-settings";
/// Storage key for the cache metadata.
pub const SETTINGS_CACHE_KEY: &str = "sessions-cache-key";

/// Injected persistent key/value backend.
///
/// Implementations must be safe to call from any thread. The lock guarding
/// the underlying data must be held only for the duration of the read or
/// write, never while calling back into other components.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store. The default for tests and for hosts that do not care
/// about settings surviving a restart.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().unwrap().remove(key);
    }
}

/// JSON-file-backed store for hosts that want settings to persist across
/// process restarts. The whole map is rewritten on every mutation; write
/// failures are logged and otherwise ignored so a read-only disk degrades
/// to in-memory behavior.
pub struct FileKeyValueStore {
    path: PathBuf,
    inner: Mutex<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`, loading any existing content. A missing
    /// file starts empty; an unparsable file is discarded with a warning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("discarding unparsable store at {:?}: {}", path, e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CacheError::IoError(e)),
        };
        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    fn persist(&self, map: &HashMap<String, String>) {
        let serialized = match serde_json::to_string(map) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize store: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!("failed to persist store at {:?}: {}", self.path, e);
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let snapshot = {
            let mut map = self.inner.lock().unwrap();
            map.insert(key.to_string(), value.to_string());
            map.clone()
        };
        // Lock released before touching the filesystem.
        self.persist(&snapshot);
    }

    fn remove(&self, key: &str) {
        let snapshot = {
            let mut map = self.inner.lock().unwrap();
            map.remove(key);
            map.clone()
        };
        self.persist(&snapshot);
    }
}

/// Namespaced, typed view over a [`KeyValueStore`].
///
/// The whole settings blob is the unit of truth: `update_contents` replaces
/// everything previously stored, including keys belonging to other
/// namespaces. Reads project individual keys out of the blob through a
/// type check; a value of the wrong shape reads as absent.
pub struct SettingsCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl SettingsCache {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
        }
    }

    fn content(&self) -> Option<Value> {
        let raw = self.store.get(SETTINGS_CONTENT_KEY)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) if v.is_object() => Some(v),
            Ok(_) => {
                debug!("cached settings blob is not a map; treating as absent");
                None
            }
            Err(e) => {
                debug!("cached settings blob unparsable ({}); treating as absent", e);
                None
            }
        }
    }

    /// Typed projection of a root-level key. Absent or wrong-typed values
    /// read as `None`.
    pub fn root_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = self.content()?;
        let value = content.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Typed projection of a key inside the configured namespace map.
    ///
    /// When the namespace map is absent entirely, falls back to a
    /// root-level lookup so the legacy flat layout stays readable.
    pub fn namespaced_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = self.content()?;
        match content.get(&self.namespace) {
            Some(ns) if ns.is_object() => {
                let value = ns.get(key)?;
                serde_json::from_value(value.clone()).ok()
            }
            Some(_) => None,
            None => {
                let value = content.get(key)?;
                serde_json::from_value(value.clone()).ok()
            }
        }
    }

    /// Replaces the entire cached blob. Keys not present in `content`,
    /// including other namespaces' data, are dropped.
    pub fn update_contents(&self, content: &Value) {
        match serde_json::to_string(content) {
            Ok(raw) => self.store.set(SETTINGS_CONTENT_KEY, &raw),
            Err(e) => warn!("failed to serialize settings content: {}", e),
        }
    }

    pub fn update_metadata(&self, cache_key: &CacheKey) {
        match serde_json::to_string(cache_key) {
            Ok(raw) => self.store.set(SETTINGS_CACHE_KEY, &raw),
            Err(e) => warn!("failed to serialize cache key: {}", e),
        }
    }

    /// Reads back the metadata written by [`update_metadata`]. Corrupted
    /// metadata reads as `None`, same as no metadata at all.
    ///
    /// [`update_metadata`]: SettingsCache::update_metadata
    pub fn cache_key(&self) -> Option<CacheKey> {
        let raw = self.store.get(SETTINGS_CACHE_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn has_content(&self) -> bool {
        self.content().is_some()
    }

    pub fn remove_cache(&self) {
        self.store.remove(SETTINGS_CONTENT_KEY);
        self.store.remove(SETTINGS_CACHE_KEY);
    }

    /// Cache duration declared by the cached payload itself, or the default
    /// when absent or unparsable.
    pub fn cache_duration(&self) -> std::time::Duration {
        self.root_value::<f64>(CACHE_DURATION_KEY)
            .filter(|secs| *secs >= 0.0)
            .map(std::time::Duration::from_secs_f64)
            .unwrap_or(DEFAULT_CACHE_DURATION)
    }

    /// Returns false only while the metadata app ID and version both match
    /// the live application AND the elapsed time since `created_at` is
    /// strictly below the declared cache duration. Missing or corrupted
    /// metadata counts as expired.
    pub fn is_expired(&self, app_info: &ApplicationInfo, now: DateTime<Utc>) -> bool {
        let key = match self.cache_key() {
            Some(key) => key,
            None => return true,
        };
        if key.google_app_id != app_info.app_id {
            return true;
        }
        if key.app_version != app_info.synthesized_version() {
            return true;
        }
        let elapsed = match (now - key.created_at).to_std() {
            Ok(elapsed) => elapsed,
            // Clock moved backwards relative to the write; keep serving.
            Err(_) => return false,
        };
        elapsed >= self.cache_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_info::LogEnvironment;
    use chrono::TimeZone;
    use serde_json::json;

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

    fn sim_cache() -> SettingsCache {
        SettingsCache::new(Arc::new(MemoryKeyValueStore::new()), "app_quality")
    }

    fn fetch_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_635_739_200, 0).unwrap()
    }

    fn valid_settings() -> Value {
        json!({
            "cache_duration": 10,
            "app_quality": {
                "sessions_enabled": false,
                "sampling_rate": 0.5,
                "session_timeout_seconds": 10
            }
        })
    }

    fn metadata_for(cache: &SettingsCache, app_info: &ApplicationInfo, at: DateTime<Utc>) {
        cache.update_metadata(&CacheKey {
            created_at: at,
            google_app_id: app_info.app_id.clone(),
            app_version: app_info.synthesized_version(),
        });
    }

    #[test]
    fn empty_cache_reads_absent() {
        let cache = sim_cache();
        assert_eq!(cache.root_value::<f64>("cache_duration"), None);
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), None);
        assert!(!cache.has_content());
        assert!(cache.cache_key().is_none());
    }

    #[test]
    fn typed_projection_rejects_wrong_shape() {
        let cache = sim_cache();
        cache.update_contents(&json!({
            "cache_duration": "not-a-number",
            "app_quality": { "sessions_enabled": 17 }
        }));
        assert_eq!(cache.root_value::<f64>("cache_duration"), None);
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), None);
    }

    #[test]
    fn corrupted_blob_reads_absent() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cache = SettingsCache::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, "app_quality");
        store.set(SETTINGS_CONTENT_KEY, "{{{{ non_key: non\"value {}");
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), None);
        assert!(!cache.has_content());
    }

    #[test]
    fn corrupted_cache_key_reads_absent() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cache = SettingsCache::new(Arc::clone(&store) as Arc<dyn KeyValueStore>, "app_quality");
        store.set(SETTINGS_CACHE_KEY, "{{{{ non_key: non\"value {}");
        assert!(cache.cache_key().is_none());
        assert!(cache.is_expired(&sim_app_info(), fetch_time()));
    }

    #[test]
    fn update_contents_replaces_whole_blob() {
        let cache = sim_cache();
        cache.update_contents(&json!({
            "cache_duration": 10,
            "other_namespace": { "some_flag": true },
            "app_quality": { "sessions_enabled": true }
        }));
        cache.update_contents(&json!({
            "cache_duration": 20,
            "app_quality": { "sessions_enabled": false }
        }));
        // Foreign-namespace keys from the first write are gone.
        assert_eq!(
            cache.root_value::<serde_json::Map<String, Value>>("other_namespace"),
            None
        );
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), Some(false));
        assert_eq!(cache.root_value::<f64>("cache_duration"), Some(20.0));
    }

    #[test]
    fn legacy_flat_layout_read_through_namespace_lookup() {
        let cache = sim_cache();
        cache.update_contents(&json!({
            "cache_duration": 10,
            "sessions_enabled": true,
            "sampling_rate": 0.25
        }));
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), Some(true));
        assert_eq!(cache.namespaced_value::<f64>("sampling_rate"), Some(0.25));
    }

    #[test]
    fn unknown_extra_keys_are_ignored() {
        let cache = sim_cache();
        cache.update_contents(&json!({
            "cache_duration": 10,
            "future_root_key": [1, 2, 3],
            "app_quality": {
                "sessions_enabled": true,
                "future_nested_key": { "deep": true }
            }
        }));
        assert_eq!(cache.namespaced_value::<bool>("sessions_enabled"), Some(true));
    }

    #[test]
    fn is_expired_respects_ttl_boundary() {
        let cache = sim_cache();
        let app_info = sim_app_info();
        cache.update_contents(&valid_settings());
        metadata_for(&cache, &app_info, fetch_time());

        // TTL = 10: still valid at +5, expired at >= 10.
        assert!(!cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(5)));
        assert!(cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(10)));
        assert!(cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(11)));
    }

    #[test]
    fn is_expired_on_app_version_change() {
        let cache = sim_cache();
        let mut app_info = sim_app_info();
        cache.update_contents(&valid_settings());
        metadata_for(&cache, &app_info, fetch_time());

        app_info.app_build_version = "2".to_string();
        assert!(cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn is_expired_on_app_id_change() {
        let cache = sim_cache();
        let mut app_info = sim_app_info();
        cache.update_contents(&valid_settings());
        metadata_for(&cache, &app_info, fetch_time());

        app_info.app_id = "another-app-id".to_string();
        assert!(cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn missing_cache_duration_uses_default() {
        let cache = sim_cache();
        let app_info = sim_app_info();
        cache.update_contents(&json!({ "app_quality": {} }));
        metadata_for(&cache, &app_info, fetch_time());
        assert_eq!(cache.cache_duration(), DEFAULT_CACHE_DURATION);
        assert!(!cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(3599)));
        assert!(cache.is_expired(&app_info, fetch_time() + chrono::Duration::seconds(3600)));
    }

    #[test]
    fn remove_cache_clears_content_and_metadata() {
        let cache = sim_cache();
        cache.update_contents(&valid_settings());
        metadata_for(&cache, &sim_app_info(), fetch_time());
        cache.remove_cache();
        assert!(!cache.has_content());
        assert!(cache.cache_key().is_none());
    }

    #[test]
    fn file_store_round_trips_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings-store.json");

        {
            let store = FileKeyValueStore::open(&path).expect("open store");
            store.set("alpha", "1");
            store.set("beta", "2");
            store.remove("alpha");
        }

        let store = FileKeyValueStore::open(&path).expect("reopen store");
        assert_eq!(store.get("alpha"), None);
        assert_eq!(store.get("beta"), Some("2".to_string()));
    }

    #[test]
    fn file_store_discards_unparsable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings-store.json");
        std::fs::write(&path, "not json at all").expect("write garbage");

        let store = FileKeyValueStore::open(&path).expect("open store");
        assert_eq!(store.get("anything"), None);
    }
}
