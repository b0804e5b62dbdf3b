//! Top-level session orchestration.
//!
//! `Sessions` owns the subscriber registry and wires the initiator,
//! generator, settings, and coordinator into one pipeline. Each initiation
//! (cold start included) runs the pipeline once: check dependencies,
//! refresh settings, rotate the session, broadcast the new identity, gate,
//! and dispatch the session-start event. The outcome — success or one of
//! the `SessionsError` variants — is delivered through the completion
//! callback; none of the failures are fatal.

use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::Notify;

use crate::app_info::ApplicationInfo;
use crate::coordinator::SessionCoordinator;
use crate::error_handling::types::SessionsError;
use crate::events::session_start::SessionStartEvent;
use crate::session_management::generator::SessionGenerator;
use crate::session_management::initiator::SessionInitiator;
use crate::session_management::types::SessionDetails;
use crate::settings::SessionsSettings;
use crate::subscribers::dependencies::SessionsDependencies;
use crate::subscribers::types::{SessionsSubscriber, SubscriberName};

/// Invoked once per session-start attempt with the final outcome.
pub type LoggedEventCallback = Arc<dyn Fn(Result<(), SessionsError>) + Send + Sync>;

/// Tracks which declared dependencies have registered a live subscriber.
/// The pipeline parks on this gate so that gating never runs against a
/// half-registered world during SDK startup.
struct RegistrationGate {
    registered: Mutex<HashSet<SubscriberName>>,
    notify: Notify,
}

impl RegistrationGate {
    fn new() -> Self {
        Self {
            registered: Mutex::new(HashSet::new()),
            notify: Notify::new(),
        }
    }

    fn mark(&self, name: SubscriberName) {
        self.registered.lock().unwrap().insert(name);
        self.notify.notify_waiters();
    }

    async fn wait_for(&self, expected: &HashSet<SubscriberName>) {
        loop {
            // The notified future must exist before the check, otherwise a
            // registration landing in between is a missed wakeup.
            let notified = self.notify.notified();
            {
                let registered = self.registered.lock().unwrap();
                if expected.iter().all(|name| registered.contains(name)) {
                    return;
                }
            }
            notified.await;
        }
    }
}

struct SessionsInner {
    app_id: String,
    app_info: ApplicationInfo,
    settings: Arc<SessionsSettings>,
    generator: Mutex<SessionGenerator>,
    coordinator: SessionCoordinator,
    initiator: SessionInitiator,
    dependencies: Arc<SessionsDependencies>,
    subscribers: Mutex<HashMap<SubscriberName, Arc<dyn SessionsSubscriber>>>,
    registration: RegistrationGate,
    completion: LoggedEventCallback,
}

impl SessionsInner {
    async fn log_session_start(&self) {
        let result = self.run_session_pipeline().await;
        log_session_result(&result);
        (self.completion)(result);
    }

    async fn run_session_pipeline(&self) -> Result<(), SessionsError> {
        // Without declared dependencies there is nobody to acknowledge data
        // collection for; neither settings nor the event backend are
        // touched.
        if self.dependencies.is_empty() {
            return Err(SessionsError::NoDependencies);
        }

        // Settings are refreshed even when gating fails afterwards; a stale
        // "disabled" or "zero sampling" cache must be able to self-correct.
        if let Err(e) = self.settings.update_settings(Utc::now()).await {
            warn!("settings refresh failed, continuing with cached values: {}", e);
        }

        let session_info = { self.generator.lock().unwrap().generate_new_session() };
        let details = SessionDetails {
            session_id: Some(session_info.session_id.clone()),
        };

        // Subscribers always learn the new session id, even when no event
        // is ultimately dispatched.
        for (_, subscriber) in self.subscriber_snapshot() {
            subscriber.on_session_changed(details.clone());
        }

        // Subscribers registering later than this point get the id replayed
        // at registration time; here we only wait until every declared
        // dependency has shown up before gating on their collection flags.
        self.registration.wait_for(&self.dependencies.names()).await;

        if !self.settings.sessions_enabled() {
            return Err(SessionsError::DisabledViaSettings);
        }
        if !session_info.should_dispatch_events {
            return Err(SessionsError::SessionSampling);
        }

        let subscribers = self.subscriber_snapshot();
        let any_collection_enabled = subscribers
            .iter()
            .any(|(_, s)| s.is_data_collection_enabled());
        if !any_collection_enabled {
            return Err(SessionsError::DataCollection);
        }

        let mut event = SessionStartEvent::new(&session_info, self.app_info.clone(), Utc::now());
        event.set_sampling_rate(self.settings.sampling_rate());
        for (name, subscriber) in &subscribers {
            event.set_subscriber(*name, subscriber.is_data_collection_enabled());
        }

        self.coordinator.attempt_logging_session_start(event).await
    }

    fn subscriber_snapshot(&self) -> Vec<(SubscriberName, Arc<dyn SessionsSubscriber>)> {
        // Copied out under the lock; the lock is never held while calling
        // into a subscriber.
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(name, subscriber)| (*name, Arc::clone(subscriber)))
            .collect()
    }

    fn current_session_details(&self) -> SessionDetails {
        let generator = self.generator.lock().unwrap();
        SessionDetails {
            session_id: generator.current_session().map(|s| s.session_id.clone()),
        }
    }
}

/// Entry point of the SDK.
///
/// Construction via [`start`] registers for lifecycle events and
/// immediately initiates the cold-start session, so it must happen inside
/// a tokio runtime. The host feeds lifecycle transitions through
/// [`app_backgrounded`] / [`app_foregrounded`].
///
/// [`start`]: Sessions::start
/// [`app_backgrounded`]: Sessions::app_backgrounded
/// [`app_foregrounded`]: Sessions::app_foregrounded
pub struct Sessions {
    inner: Arc<SessionsInner>,
}

impl Sessions {
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        app_id: String,
        app_info: ApplicationInfo,
        settings: Arc<SessionsSettings>,
        generator: SessionGenerator,
        coordinator: SessionCoordinator,
        initiator: SessionInitiator,
        dependencies: Arc<SessionsDependencies>,
        completion: LoggedEventCallback,
    ) -> Self {
        let inner = Arc::new(SessionsInner {
            app_id,
            app_info,
            settings,
            generator: Mutex::new(generator),
            coordinator,
            initiator,
            dependencies,
            subscribers: Mutex::new(HashMap::new()),
            registration: RegistrationGate::new(),
            completion,
        });

        info!(
            "sessions starting for app {}; expecting subscriptions from {:?}",
            inner.app_id,
            inner.dependencies.names()
        );

        // Each initiation runs the pipeline as its own task; a slow fetch
        // delays only that session's outcome. Weak breaks the cycle between
        // the initiator's stored callback and the orchestrator.
        let weak: Weak<SessionsInner> = Arc::downgrade(&inner);
        inner.initiator.begin_listening(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                tokio::spawn(async move {
                    inner.log_session_start().await;
                });
            }
        }));

        Sessions { inner }
    }

    /// Starts with a no-op completion handler. Outcomes are still written
    /// to the log by the pipeline itself.
    pub fn start_with_logging(
        app_id: String,
        app_info: ApplicationInfo,
        settings: Arc<SessionsSettings>,
        generator: SessionGenerator,
        coordinator: SessionCoordinator,
        initiator: SessionInitiator,
        dependencies: Arc<SessionsDependencies>,
    ) -> Self {
        Self::start(
            app_id,
            app_info,
            settings,
            generator,
            coordinator,
            initiator,
            dependencies,
            Arc::new(|_| {}),
        )
    }

    /// Registers a live subscriber. The current session details are
    /// replayed immediately so a subscriber starting after the cold-start
    /// broadcast still learns the session id.
    pub fn register_subscriber(&self, subscriber: Arc<dyn SessionsSubscriber>) {
        let name = subscriber.name();
        debug!(
            "registering subscriber {} (collection enabled: {})",
            name,
            subscriber.is_data_collection_enabled()
        );

        subscriber.on_session_changed(self.inner.current_session_details());

        self.inner
            .subscribers
            .lock()
            .unwrap()
            .insert(name, subscriber);
        self.inner.registration.mark(name);
    }

    /// Read-only snapshot of the current session identity.
    pub fn current_session_details(&self) -> SessionDetails {
        self.inner.current_session_details()
    }

    pub fn app_backgrounded(&self) {
        self.inner.initiator.app_backgrounded();
    }

    pub fn app_foregrounded(&self) {
        self.inner.initiator.app_foregrounded();
    }
}

/// Logs one session-start outcome at the level its severity deserves.
pub fn log_session_result(result: &Result<(), SessionsError>) {
    match result {
        Ok(()) => info!("successfully logged session-start event"),
        Err(SessionsError::SessionInstallations(e)) => {
            error!("error getting installation ID: {}; skipping this session event", e);
        }
        Err(SessionsError::DataTransport(e)) => {
            error!("error logging session-start event to transport: {}", e);
        }
        Err(SessionsError::NoDependencies) => {
            error!("no dependent SDKs registered as dependencies; events will not be sent");
        }
        Err(SessionsError::SessionSampling) => {
            debug!("this session was sampled out");
        }
        Err(SessionsError::DisabledViaSettings) => {
            debug!("sessions are disabled via settings");
        }
        Err(SessionsError::DataCollection) => {
            debug!("data collection is disabled for all subscribers; skipping this session event");
        }
    }
}
