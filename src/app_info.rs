//! Identity of the host application.
//!
//! `ApplicationInfo` is captured once at SDK startup and rides along in
//! every session-start event. It also feeds cache invalidation: settings
//! cached under a different app ID or version are treated as stale.

use serde::{Deserialize, Serialize};

/// Deployment environment the events are logged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEnvironment {
    Prod,
    Staging,
    Autopush,
}

impl Default for LogEnvironment {
    fn default() -> Self {
        LogEnvironment::Prod
    }
}

/// Static description of the running application.
///
/// # Fields Overview
///
/// - `app_id`: the backend-assigned application identifier
/// - `app_build_version`: machine build number (e.g. `"427"`)
/// - `app_display_version`: user-facing version (e.g. `"1.2.3"`)
/// - `os_name`: host operating system name
/// - `device_model`: hardware model string
/// - `sdk_version`: version of this SDK
/// - `log_environment`: backend environment events are routed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub app_id: String,
    pub app_build_version: String,
    pub app_display_version: String,
    pub os_name: String,
    pub device_model: String,
    pub sdk_version: String,
    #[serde(default)]
    pub log_environment: LogEnvironment,
}

impl ApplicationInfo {
    /// Combined version string used as the cache-invalidation key. A change
    /// in either component invalidates previously cached settings.
    pub fn synthesized_version(&self) -> String {
        format!("{} ({})", self.app_display_version, self.app_build_version)
    }
}
