//! The session-start event.
//!
//! Built once per eligible session and handed to the injected event
//! logger. The JSON layout mirrors the backend's event schema: a
//! `session_data` block with the rotating identity and per-subscriber
//! collection status, and an `application_info` block describing the host
//! app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_info::ApplicationInfo;
use crate::session_management::types::SessionInfo;
use crate::subscribers::types::SubscriberName;

/// Collection status of one subscriber SDK at event time.
///
/// `SdkNotInstalled` is the default and means the subscriber never
/// registered; the other two reflect the registered subscriber's own
/// collection flag, queried live when the event is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCollectionState {
    SdkNotInstalled,
    Disabled,
    Enabled,
}

impl Default for DataCollectionState {
    fn default() -> Self {
        DataCollectionState::SdkNotInstalled
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCollectionStatus {
    pub crashlytics: DataCollectionState,
    pub performance: DataCollectionState,
    pub session_sampling_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub previous_session_id: Option<String>,
    pub session_index: u64,
    pub event_timestamp_us: i64,
    /// Stamped by the coordinator after installation identity resolves.
    pub installation_id: String,
    pub data_collection_status: DataCollectionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStartEvent {
    pub event_type: EventType,
    pub session_data: SessionData,
    pub application_info: ApplicationInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
}

impl SessionStartEvent {
    pub fn new(
        session_info: &SessionInfo,
        app_info: ApplicationInfo,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: EventType::SessionStart,
            session_data: SessionData {
                session_id: session_info.session_id.clone(),
                previous_session_id: session_info.previous_session_id.clone(),
                session_index: session_info.session_index,
                event_timestamp_us: time.timestamp_micros(),
                installation_id: String::new(),
                data_collection_status: DataCollectionStatus::default(),
            },
            application_info: app_info,
        }
    }

    pub fn set_installation_id(&mut self, installation_id: String) {
        self.session_data.installation_id = installation_id;
    }

    pub fn set_sampling_rate(&mut self, sampling_rate: f64) {
        self.session_data.data_collection_status.session_sampling_rate = sampling_rate;
    }

    /// Records one registered subscriber's collection flag. Subscribers
    /// that never registered keep the `SdkNotInstalled` default.
    pub fn set_subscriber(&mut self, name: SubscriberName, is_data_collection_enabled: bool) {
        let state = if is_data_collection_enabled {
            DataCollectionState::Enabled
        } else {
            DataCollectionState::Disabled
        };
        match name {
            SubscriberName::Crashlytics => {
                self.session_data.data_collection_status.crashlytics = state;
            }
            SubscriberName::Performance => {
                self.session_data.data_collection_status.performance = state;
            }
        }
    }
}
