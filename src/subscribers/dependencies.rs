//! Dependency declarations.
//!
//! Subscriber SDKs declare their intent to participate *before* the first
//! session is logged; the set of declared names gates the whole pipeline.
//! This is an explicit registry object rather than process-global state so
//! its lifetime can be injected and reset between test runs.

use log::debug;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::subscribers::types::SubscriberName;

#[derive(Default)]
pub struct SessionsDependencies {
    names: Mutex<HashSet<SubscriberName>>,
}

impl SessionsDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that the named subscriber intends to register. Must happen
    /// before the first session log attempt.
    pub fn declare(&self, name: SubscriberName) {
        debug!("dependency declared: {}", name);
        self.names.lock().unwrap().insert(name);
    }

    pub fn reset(&self) {
        self.names.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.lock().unwrap().is_empty()
    }

    pub fn names(&self) -> HashSet<SubscriberName> {
        self.names.lock().unwrap().clone()
    }
}
