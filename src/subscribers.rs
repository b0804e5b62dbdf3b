//! Subscriber SDK surface.
//!
//! Subscribers (crash and performance monitors) learn the current session
//! id through `SessionsSubscriber::on_session_changed` and gate their own
//! data collection independently. Participation must be declared up front
//! through `SessionsDependencies`.

pub mod dependencies;
pub mod types;

pub use dependencies::SessionsDependencies;
pub use types::{SessionsSubscriber, SubscriberName};
