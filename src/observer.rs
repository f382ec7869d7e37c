//! Change notifications for the presentation layer.
//!
//! Controllers call `Notifier::notify` after every state transition. The
//! presentation layer registers a listener and re-renders from the
//! controller's accessors when called.
//!
//! ```ignore
//! let id = catalog.subscribe(|change| {
//!     println!("re-render after {:?}", change);
//! });
//! catalog.load().await?;
//! catalog.unsubscribe(&id);
//! ```

use std::sync::{Mutex, PoisonError};

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

const CHANGE_EVENT: &str = "change";

/// What part of controller state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    /// The collection state (load lifecycle or records).
    Collection,
    /// Filter, sort or page parameters.
    View,
    /// The set of in-flight mutations.
    Pending,
    /// The transient message slot.
    Message,
}

/// Fans change notifications out to registered listeners.
///
/// Listeners run on the emitter's own threads, so delivery is asynchronous
/// with respect to the call that changed the state.
pub struct Notifier {
    emitter: Mutex<EventEmitter>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener; returns the id to pass to `unsubscribe`.
    pub fn subscribe<F>(&self, listener: F) -> String
    where
        F: Fn(Change) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(CHANGE_EVENT, listener)
    }

    /// Remove a listener. Returns true if it was registered.
    pub fn unsubscribe(&self, id: &str) -> bool {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_listener(id)
            .is_some()
    }

    pub fn notify(&self, change: Change) {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(CHANGE_EVENT, change);
    }
}
