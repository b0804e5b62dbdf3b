//! Session lifecycle core.
//!
//! This module provides the pieces that decide when a session exists and
//! what it is called: the lifecycle-driven initiator, the identity
//! generator, the sampling gate, and the session data types.

pub mod generator;
pub mod initiator;
pub mod sampler;
pub mod types;

pub use generator::SessionGenerator;
pub use initiator::{InitiationCallback, SessionInitiator, TimeProvider};
pub use sampler::SessionSampler;
pub use types::{SessionDetails, SessionInfo};
