//! Telemetry event types dispatched by the coordinator.

pub mod session_start;

pub use session_start::{
    DataCollectionState, DataCollectionStatus, EventType, SessionData, SessionStartEvent,
};
