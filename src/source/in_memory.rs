use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::{DataSource, SourceError, WritableSource};
use crate::record::{capitalized, Record};

type Factory<R, D> = Arc<dyn Fn(&D, usize) -> R + Send + Sync>;
type TransitionFn<R> = Arc<dyn Fn(&R, &str) -> Result<R, String> + Send + Sync>;

/// In-memory data source backed by a shared `Vec`.
///
/// Stands in for the backend on pages that work from a fixed list, and in
/// tests. Clones share the same records.
///
/// - Reads return the records in insertion order.
/// - Creation turns a draft into a record through a factory; the factory
///   receives the draft and the 1-based sequence number of the new record.
/// - Transitions go through a registered function. Unknown ids are rejected
///   with "`<Kind>` not found", unregistered transitions with "unsupported action".
pub struct InMemorySource<R, D = R> {
    records: Arc<RwLock<Vec<R>>>,
    factory: Factory<R, D>,
    transition: Option<TransitionFn<R>>,
    _draft: PhantomData<fn(&D)>,
}

impl<R: Record, D> Clone for InMemorySource<R, D> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            factory: Arc::clone(&self.factory),
            transition: self.transition.clone(),
            _draft: PhantomData,
        }
    }
}

impl<R: Record> InMemorySource<R, R> {
    /// Create a source whose drafts are complete records.
    pub fn new(records: Vec<R>) -> Self {
        Self::with_factory(records, |draft: &R, _| draft.clone())
    }
}

impl<R: Record, D> InMemorySource<R, D> {
    /// Create a source that builds records from drafts with `factory`.
    pub fn with_factory<F>(records: Vec<R>, factory: F) -> Self
    where
        F: Fn(&D, usize) -> R + Send + Sync + 'static,
    {
        Self {
            records: Arc::new(RwLock::new(records)),
            factory: Arc::new(factory),
            transition: None,
            _draft: PhantomData,
        }
    }

    /// Register the function applied by `transition`.
    pub fn with_transition<F>(mut self, transition: F) -> Self
    where
        F: Fn(&R, &str) -> Result<R, String> + Send + Sync + 'static,
    {
        self.transition = Some(Arc::new(transition));
        self
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<R> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the stored records.
    pub fn replace(&self, records: Vec<R>) {
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = records;
    }
}

impl<R, D> DataSource for InMemorySource<R, D>
where
    R: Record,
    D: 'static,
{
    type Record = R;

    async fn fetch_all(&self) -> Result<Vec<R>, SourceError> {
        Ok(self.records())
    }
}

impl<R, D> WritableSource for InMemorySource<R, D>
where
    R: Record,
    D: Serialize + Send + Sync + 'static,
{
    type Draft = D;

    async fn create(&self, draft: &D) -> Result<R, SourceError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = (self.factory)(draft, records.len() + 1);
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(SourceError::rejected(format!(
                "{} already exists",
                capitalized(R::KIND)
            )));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn transition(&self, id: &R::Id, action: &str) -> Result<R, SourceError> {
        let transition = self
            .transition
            .as_ref()
            .ok_or_else(|| SourceError::rejected(format!("unsupported action: {}", action)))?;

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| SourceError::rejected(format!("{} not found", capitalized(R::KIND))))?;

        let updated = transition(slot, action).map_err(SourceError::rejected)?;
        *slot = updated.clone();
        Ok(updated)
    }
}
