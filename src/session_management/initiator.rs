//! Lifecycle-driven session initiation.
//!
//! `SessionInitiator` is a two-state machine fed by the host application's
//! foreground/background transitions. It decides *when* a new session
//! begins and fires the registered callback; what happens on initiation is
//! entirely the orchestrator's business.

use chrono::{DateTime, Utc};
use log::debug;
use std::sync::{Arc, Mutex};

use crate::settings::SessionsSettings;

/// Injected clock, replaceable in tests.
pub type TimeProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Fired once per session initiation, including the cold start.
pub type InitiationCallback = Arc<dyn Fn() + Send + Sync>;

enum LifecycleState {
    Foregrounded,
    Backgrounded { at: DateTime<Utc> },
}

/// State machine over app lifecycle events.
///
/// Construction implies a cold start: the app is considered foregrounded,
/// and [`begin_listening`] fires the callback immediately for the first
/// session. After that a new session starts only when the app returns to
/// the foreground after more than `session_timeout` in the background.
/// The timeout is read from settings at the moment of the foreground
/// check, so a settings change while backgrounded takes effect.
///
/// [`begin_listening`]: SessionInitiator::begin_listening
pub struct SessionInitiator {
    settings: Arc<SessionsSettings>,
    clock: TimeProvider,
    state: Mutex<LifecycleState>,
    callback: Mutex<Option<InitiationCallback>>,
}

impl SessionInitiator {
    pub fn new(settings: Arc<SessionsSettings>) -> Self {
        Self::with_time_provider(settings, Arc::new(Utc::now))
    }

    pub fn with_time_provider(settings: Arc<SessionsSettings>, clock: TimeProvider) -> Self {
        Self {
            settings,
            clock,
            state: Mutex::new(LifecycleState::Foregrounded),
            callback: Mutex::new(None),
        }
    }

    /// Registers the initiation callback and fires it once for the
    /// cold-start session.
    pub fn begin_listening(&self, callback: InitiationCallback) {
        *self.callback.lock().unwrap() = Some(Arc::clone(&callback));
        debug!("initiating cold-start session");
        callback();
    }

    /// Records the time of backgrounding. Never fires the callback.
    pub fn app_backgrounded(&self) {
        let now = (self.clock)();
        *self.state.lock().unwrap() = LifecycleState::Backgrounded { at: now };
        debug!("app backgrounded at {}", now);
    }

    /// Returns to the foreground. Fires the callback only when the stay in
    /// the background strictly exceeded the session timeout; an elapsed
    /// time equal to the timeout continues the same session.
    pub fn app_foregrounded(&self) {
        // Settings are consulted before taking the state lock; the lock is
        // released before the callback fires.
        let timeout = self.settings.session_timeout();
        let now = (self.clock)();

        let rotate = {
            let mut state = self.state.lock().unwrap();
            let rotate = match *state {
                LifecycleState::Backgrounded { at } => match (now - at).to_std() {
                    Ok(elapsed) => elapsed > timeout,
                    Err(_) => false,
                },
                LifecycleState::Foregrounded => false,
            };
            *state = LifecycleState::Foregrounded;
            rotate
        };

        if rotate {
            debug!("session timed out in background; initiating new session");
            let callback = self.callback.lock().unwrap().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}
