//! Self-expiring success/error messages.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::observer::{Change, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// A notification that clears itself after the slot's time-to-live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMessage {
    pub kind: MessageKind,
    pub text: String,
    pub created_at: Instant,
}

#[derive(Default)]
struct SlotState {
    current: Option<TransientMessage>,
    expiry: Option<JoinHandle<()>>,
    generation: u64,
}

/// Holds at most one transient message.
///
/// Showing a message aborts the expiry timer of the previous one, so a newer
/// message is never cleared by an older deadline. Expiry needs a tokio
/// runtime; outside one the message stays until replaced or dismissed.
pub struct MessageSlot {
    state: Arc<Mutex<SlotState>>,
    ttl: Duration,
    notifier: Arc<Notifier>,
}

impl MessageSlot {
    pub fn new(ttl: Duration, notifier: Arc<Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState::default())),
            ttl,
            notifier,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The message currently on display, if any.
    pub fn current(&self) -> Option<TransientMessage> {
        lock(&self.state).current.clone()
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(MessageKind::Success, text.into());
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(MessageKind::Error, text.into());
    }

    pub fn show(&self, kind: MessageKind, text: String) {
        {
            let mut state = lock(&self.state);
            if let Some(previous) = state.expiry.take() {
                previous.abort();
            }
            state.generation += 1;
            state.current = Some(TransientMessage {
                kind,
                text,
                created_at: Instant::now(),
            });

            let runtime = match Handle::try_current() {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::warn!(error = %err, "no tokio runtime; message will not expire");
                    drop(state);
                    self.notifier.notify(Change::Message);
                    return;
                }
            };

            let generation = state.generation;
            let slot = Arc::clone(&self.state);
            let notifier = Arc::clone(&self.notifier);
            let ttl = self.ttl;
            state.expiry = Some(runtime.spawn(async move {
                tokio::time::sleep(ttl).await;
                let cleared = {
                    let mut state = lock(&slot);
                    // an aborted timer can still be past its last await
                    if state.generation == generation {
                        state.current = None;
                        state.expiry = None;
                        true
                    } else {
                        false
                    }
                };
                if cleared {
                    notifier.notify(Change::Message);
                }
            }));
        }
        self.notifier.notify(Change::Message);
    }

    /// Clear the message now and cancel its timer.
    pub fn dismiss(&self) {
        let had_message = {
            let mut state = lock(&self.state);
            if let Some(expiry) = state.expiry.take() {
                expiry.abort();
            }
            state.generation += 1;
            state.current.take().is_some()
        };
        if had_message {
            self.notifier.notify(Change::Message);
        }
    }
}

impl Drop for MessageSlot {
    fn drop(&mut self) {
        if let Some(expiry) = lock(&self.state).expiry.take() {
            expiry.abort();
        }
    }
}

fn lock(state: &Mutex<SlotState>) -> MutexGuard<'_, SlotState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
