//! Session identity generation.

use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::session_management::sampler::SessionSampler;
use crate::session_management::types::SessionInfo;
use crate::settings::SessionsSettings;

/// Produces session identities. Owns the current [`SessionInfo`]; each call
/// to [`generate_new_session`] rotates unconditionally, there is no no-op
/// rotation.
///
/// [`generate_new_session`]: SessionGenerator::generate_new_session
pub struct SessionGenerator {
    settings: Arc<SessionsSettings>,
    current: Option<SessionInfo>,
}

impl SessionGenerator {
    pub fn new(settings: Arc<SessionsSettings>) -> Self {
        Self {
            settings,
            current: None,
        }
    }

    /// Rotates to a new session: fresh 32-character lowercase hex id, the
    /// prior id carried as `previous_session_id`, and a sampling verdict
    /// computed against the settings in effect right now.
    pub fn generate_new_session(&mut self) -> SessionInfo {
        let session_id = Uuid::new_v4().simple().to_string();
        let previous_session_id = self.current.as_ref().map(|s| s.session_id.clone());
        let session_index = self
            .current
            .as_ref()
            .map(|s| s.session_index + 1)
            .unwrap_or(0);

        let sampling_rate = self.settings.sampling_rate();
        let should_dispatch_events = SessionSampler::should_send_event_for_session(sampling_rate);

        debug!(
            "generated session {} (index {}, dispatch: {})",
            session_id, session_index, should_dispatch_events
        );

        let info = SessionInfo {
            session_id,
            previous_session_id,
            should_dispatch_events,
            session_index,
        };
        self.current = Some(info.clone());
        info
    }

    /// `None` before the first rotation.
    pub fn current_session(&self) -> Option<&SessionInfo> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_info::{ApplicationInfo, LogEnvironment};
    use crate::error_handling::types::SettingsError;
    use crate::settings::cache::{KeyValueStore, MemoryKeyValueStore, SettingsCache};
    use crate::settings::providers::LocalOverrideSettings;
    use crate::settings::remote::{RemoteSettings, SettingsDownloader};
    use crate::settings::types::SETTINGS_NAMESPACE;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EmptyDownloader;

    #[async_trait]
    impl SettingsDownloader for EmptyDownloader {
        async fn fetch(&self) -> Result<Value, SettingsError> {
            Ok(json!({}))
        }
    }

    fn sim_settings(sampling_rate: Option<f64>) -> Arc<SessionsSettings> {
        let app_info = ApplicationInfo {
            app_id: "test-app-id".to_string(),
            app_build_version: "1".to_string(),
            app_display_version: "1.0.0".to_string(),
            os_name: "linux".to_string(),
            device_model: "generic".to_string(),
            sdk_version: "0.1.0".to_string(),
            log_environment: LogEnvironment::default(),
        };
        let store = Arc::new(MemoryKeyValueStore::new()) as Arc<dyn KeyValueStore>;
        let cache = SettingsCache::new(store, SETTINGS_NAMESPACE);
        let remote = Arc::new(RemoteSettings::new(app_info, Arc::new(EmptyDownloader), cache));
        let local = Arc::new(LocalOverrideSettings::new());
        local.set_sampling_rate(sampling_rate);
        Arc::new(SessionsSettings::new(local, remote))
    }

    #[test]
    fn ids_are_32_lowercase_hex_without_separators() {
        let mut generator = SessionGenerator::new(sim_settings(None));
        for _ in 0..10 {
            let info = generator.generate_new_session();
            assert_eq!(info.session_id.len(), 32);
            assert!(info
                .session_id
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert!(!info.session_id.contains('-'));
        }
    }

    #[test]
    fn consecutive_rotations_chain_previous_id() {
        let mut generator = SessionGenerator::new(sim_settings(None));
        assert!(generator.current_session().is_none());

        let first = generator.generate_new_session();
        assert_eq!(first.previous_session_id, None);
        assert_eq!(first.session_index, 0);

        let second = generator.generate_new_session();
        assert_ne!(second.session_id, first.session_id);
        assert_eq!(second.previous_session_id, Some(first.session_id));
        assert_eq!(second.session_index, 1);

        assert_eq!(generator.current_session(), Some(&second));
    }

    #[test]
    fn sampling_rate_one_always_dispatches() {
        let mut generator = SessionGenerator::new(sim_settings(Some(1.0)));
        for _ in 0..20 {
            assert!(generator.generate_new_session().should_dispatch_events);
        }
    }

    #[test]
    fn sampling_rate_zero_never_dispatches() {
        let mut generator = SessionGenerator::new(sim_settings(Some(0.0)));
        for _ in 0..20 {
            assert!(!generator.generate_new_session().should_dispatch_events);
        }
    }
}
