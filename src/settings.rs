//! Settings subsystem.
//!
//! Determines whether sessions are collected, at what sampling rate, and
//! after how long a background stay a session rotates.
//!
//! Components:
//! - `cache`: the persisted key/value cache with staleness rules.
//! - `providers`: the SDK-default and local-override settings sources.
//! - `remote`: the remotely fetched source with its downloader seam.
//! - `sessions_settings`: the layered resolver producing the effective view.
//! - `types`: wire-schema keys, defaults, and cache metadata.

pub mod cache;
pub mod providers;
pub mod remote;
pub mod sessions_settings;
pub mod types;

pub use cache::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SettingsCache};
pub use providers::{LocalOverrideSettings, SdkDefaultSettings, SettingsProvider};
pub use remote::{RemoteSettings, SettingsDownloader};
pub use sessions_settings::SessionsSettings;
pub use types::CacheKey;
