//! Mutation controller - server-confirmed create and transition actions.
//!
//! A `MutationController` sits next to a `ListController` and patches its
//! collection only with records the backend returned. Nothing is changed
//! locally before the server answers.
//!
//! ## Example
//!
//! ```ignore
//! let queue = Arc::new(ListController::with_view(source, RequestFilter::default(), PendingFirst::default()));
//! let actions = MutationController::new(Arc::clone(&queue), config.message_ttl);
//!
//! queue.load().await?;
//! let confirm = |prompt: &str| ask_user(prompt);
//! match actions.submit_transition(&request_id, "approve", &confirm).await? {
//!     Submission::Applied(updated) => { /* queue already shows `updated` */ }
//!     Submission::AlreadyPending | Submission::Declined => {}
//! }
//! ```

mod pending;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::ControllerError;
use crate::list::{Filter, ListController, Sort};
use crate::message::{MessageSlot, TransientMessage};
use crate::observer::Change;
use crate::record::{capitalized, Record};
use crate::source::WritableSource;
use crate::validation::{Validate, ValidationErrors};

use pending::{CreateFlag, PendingSet};

/// Result of a submission that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<R> {
    /// The backend confirmed the mutation; this is the record it returned.
    Applied(R),
    /// The same mutation was already in flight; no request was sent.
    AlreadyPending,
    /// The user declined the confirmation prompt; no request was sent.
    Declined,
}

impl<R> Submission<R> {
    pub fn applied(self) -> Option<R> {
        match self {
            Submission::Applied(record) => Some(record),
            _ => None,
        }
    }
}

/// Asks the user to confirm a state transition.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

type RecordId<S> = <<S as crate::source::DataSource>::Record as Record>::Id;

/// Performs creates and transitions for one list view.
pub struct MutationController<S: WritableSource, F, O> {
    list: Arc<ListController<S, F, O>>,
    pending: PendingSet<RecordId<S>>,
    creating: CreateFlag,
    form_error: Mutex<Option<ControllerError>>,
    messages: MessageSlot,
}

impl<S, F, O> MutationController<S, F, O>
where
    S: WritableSource,
    F: Filter<S::Record>,
    O: Sort<S::Record>,
{
    pub fn new(list: Arc<ListController<S, F, O>>, message_ttl: Duration) -> Self {
        let notifier = Arc::clone(list.notifier());
        Self {
            pending: PendingSet::new(Arc::clone(&notifier)),
            creating: CreateFlag::new(Arc::clone(&notifier)),
            form_error: Mutex::new(None),
            messages: MessageSlot::new(message_ttl, notifier),
            list,
        }
    }

    pub fn list(&self) -> &Arc<ListController<S, F, O>> {
        &self.list
    }

    /// The transient message on display, if any.
    pub fn message(&self) -> Option<TransientMessage> {
        self.messages.current()
    }

    pub fn dismiss_message(&self) {
        self.messages.dismiss();
    }

    /// Ids with a transition in flight.
    pub fn pending_ids(&self) -> Vec<RecordId<S>> {
        self.pending.snapshot()
    }

    pub fn is_pending(&self, id: &RecordId<S>) -> bool {
        self.pending.contains(id)
    }

    /// True while a creation request is in flight.
    pub fn is_creating(&self) -> bool {
        self.creating.is_set()
    }

    /// Why the last creation failed, for display inside the form.
    pub fn form_error(&self) -> Option<ControllerError> {
        self.form_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Field-level errors of the last rejected draft.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        match self.form_error() {
            Some(ControllerError::ValidationFailure(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Validate and create a record, appending the backend's copy to the list.
    ///
    /// Only one creation runs at a time; a second call while one is in flight
    /// returns `Submission::AlreadyPending` without a request. The draft is
    /// normalized before validation and the normalized copy is what gets sent;
    /// a draft that fails validation is never sent.
    pub async fn submit_create(
        &self,
        draft: &S::Draft,
    ) -> Result<Submission<S::Record>, ControllerError>
    where
        S::Draft: Validate + Clone,
    {
        let Some(_claim) = self.creating.try_claim() else {
            tracing::debug!(kind = Self::kind(), "creation already in flight; ignoring");
            return Ok(Submission::AlreadyPending);
        };
        self.set_form_error(None);

        let mut draft = draft.clone();
        draft.normalize();
        if let Err(errors) = draft.validate() {
            return Err(self.create_failed(errors.into()));
        }

        match self.list.source().create(&draft).await {
            Ok(created) => {
                tracing::info!(kind = Self::kind(), id = %created.id(), "record created");
                let text = format!(
                    "{} \"{}\" added successfully!",
                    capitalized(Self::kind()),
                    created.label()
                );
                self.list.append(created.clone());
                self.messages.success(text);
                Ok(Submission::Applied(created))
            }
            Err(err) => Err(self.create_failed(err.into())),
        }
    }

    /// Apply `action` to the record `id` after the user confirms.
    ///
    /// While a transition for `id` is in flight, further calls for the same id
    /// return `Submission::AlreadyPending` without prompting or sending a
    /// request. On success the record is replaced by the backend's copy; on
    /// failure the list is left as it was.
    pub async fn submit_transition<C>(
        &self,
        id: &RecordId<S>,
        action: &str,
        confirm: &C,
    ) -> Result<Submission<S::Record>, ControllerError>
    where
        C: Confirm + ?Sized,
    {
        if self.pending.contains(id) {
            tracing::debug!(kind = Self::kind(), %id, action, "transition already in flight; ignoring");
            return Ok(Submission::AlreadyPending);
        }

        let prompt = format!("Are you sure you want to {} this {}?", action, Self::kind());
        if !confirm.confirm(&prompt) {
            return Ok(Submission::Declined);
        }

        let Some(claim) = self.pending.try_claim(id) else {
            return Ok(Submission::AlreadyPending);
        };

        let result = self.list.source().transition(id, action).await;
        match result {
            Ok(updated) => {
                if !self.list.replace(updated.clone()) {
                    tracing::debug!(kind = Self::kind(), %id, "updated record is not in the list");
                }
                drop(claim);
                tracing::info!(kind = Self::kind(), %id, action, "transition applied");
                self.messages.success(format!(
                    "{} {} successfully!",
                    capitalized(Self::kind()),
                    past_tense(action)
                ));
                Ok(Submission::Applied(updated))
            }
            Err(err) => {
                drop(claim);
                let err = ControllerError::from(err);
                tracing::warn!(kind = Self::kind(), %id, action, error = %err, "transition failed");
                self.messages.error(err.user_message());
                Err(err)
            }
        }
    }

    fn create_failed(&self, err: ControllerError) -> ControllerError {
        tracing::warn!(kind = Self::kind(), error = %err, "creation failed");
        self.messages.error(err.user_message());
        self.set_form_error(Some(err.clone()));
        err
    }

    fn set_form_error(&self, err: Option<ControllerError>) {
        *self.form_error.lock().unwrap_or_else(PoisonError::into_inner) = err;
        self.list.notifier().notify(Change::Pending);
    }

    fn kind() -> &'static str {
        <S::Record as Record>::KIND
    }
}

fn past_tense(action: &str) -> String {
    if action.ends_with('e') {
        format!("{}d", action)
    } else {
        format!("{}ed", action)
    }
}
