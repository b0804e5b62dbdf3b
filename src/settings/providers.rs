//! Settings sources.
//!
//! Three interchangeable providers answer the same three questions:
//! is the SDK enabled, at what rate are sessions sampled, and how long
//! may the app stay backgrounded before the session rotates. Each
//! provider may decline to answer a key, in which case the resolver
//! consults the next one in priority order.

use log::warn;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

use crate::error_handling::types::SettingsError;
use crate::settings::types::{
    DEFAULT_SAMPLING_RATE, DEFAULT_SESSIONS_ENABLED, DEFAULT_SESSION_TIMEOUT,
};

/// A single source of the three session settings. `None` means the source
/// has no opinion on that key.
pub trait SettingsProvider: Send + Sync {
    fn sessions_enabled(&self) -> Option<bool>;
    fn sampling_rate(&self) -> Option<f64>;
    fn session_timeout(&self) -> Option<Duration>;
}

/// Terminal fallback. Always produces a value for all three keys.
#[derive(Default)]
pub struct SdkDefaultSettings;

impl SettingsProvider for SdkDefaultSettings {
    fn sessions_enabled(&self) -> Option<bool> {
        Some(DEFAULT_SESSIONS_ENABLED)
    }

    fn sampling_rate(&self) -> Option<f64> {
        Some(DEFAULT_SAMPLING_RATE)
    }

    fn session_timeout(&self) -> Option<Duration> {
        Some(DEFAULT_SESSION_TIMEOUT)
    }
}

#[derive(Debug, Default, Deserialize)]
struct OverrideValues {
    sessions_enabled: Option<bool>,
    sampling_rate: Option<f64>,
    session_timeout_seconds: Option<f64>,
}

/// Developer-supplied per-key overrides. Highest priority; set
/// programmatically or loaded from a TOML table. Values can change at
/// runtime and are read live at every resolution.
#[derive(Default)]
pub struct LocalOverrideSettings {
    values: Mutex<OverrideValues>,
}

impl LocalOverrideSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses overrides from a TOML table such as:
    ///
    /// ```toml
    /// sessions_enabled = false
    /// sampling_rate = 0.25
    /// session_timeout_seconds = 600
    /// ```
    ///
    /// Unknown keys are ignored.
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        let values: OverrideValues =
            toml::from_str(raw).map_err(|e| SettingsError::InvalidPayload(e.to_string()))?;
        if let Some(rate) = values.sampling_rate {
            if !(0.0..=1.0).contains(&rate) {
                warn!("override sampling_rate {} outside [0,1]; ignoring overrides", rate);
                return Err(SettingsError::InvalidPayload(format!(
                    "sampling_rate {} outside [0,1]",
                    rate
                )));
            }
        }
        Ok(Self {
            values: Mutex::new(values),
        })
    }

    pub fn set_sessions_enabled(&self, enabled: Option<bool>) {
        self.values.lock().unwrap().sessions_enabled = enabled;
    }

    pub fn set_sampling_rate(&self, rate: Option<f64>) {
        self.values.lock().unwrap().sampling_rate = rate;
    }

    pub fn set_session_timeout(&self, timeout: Option<Duration>) {
        self.values.lock().unwrap().session_timeout_seconds = timeout.map(|t| t.as_secs_f64());
    }
}

impl SettingsProvider for LocalOverrideSettings {
    fn sessions_enabled(&self) -> Option<bool> {
        self.values.lock().unwrap().sessions_enabled
    }

    fn sampling_rate(&self) -> Option<f64> {
        self.values.lock().unwrap().sampling_rate
    }

    fn session_timeout(&self) -> Option<Duration> {
        self.values
            .lock()
            .unwrap()
            .session_timeout_seconds
            .filter(|secs| *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}
