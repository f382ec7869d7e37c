//! List controller - load lifecycle plus client-side view transforms.
//!
//! A `ListController` owns the records of one list view. The presentation
//! layer calls `load()`, adjusts the filter/sort/page parameters, and reads
//! `visible()` or `visible_page()` to render.
//!
//! ## Example
//!
//! ```ignore
//! use tutor_views::list::{ListController, NoSort};
//! use tutor_views::domain::course::{Course, CourseFilter};
//!
//! let catalog = ListController::with_view(source, CourseFilter::default(), NoSort);
//! catalog.load().await?;
//! catalog.update_filter(|f| f.query = TextQuery::new("csc"));
//! let departments = catalog.distinct_values(|c: &Course| c.department_code.clone());
//! let cards = catalog.visible();
//! ```

pub mod filter;
mod page;
pub mod sort;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ControllerError;
use crate::observer::{Change, Notifier};
use crate::record::Record;
use crate::source::DataSource;

pub use filter::{Choice, Filter, NoFilter, TextQuery, Tristate};
pub use page::Pagination;
pub use sort::{NoSort, PendingFirst, Queued, Sort, SortDirection};

/// Load lifecycle of a list view.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionState<R> {
    /// Not loaded yet.
    Idle,
    /// A fetch is in flight; the previous records stay visible.
    Loading(Vec<R>),
    /// Records in the order the source returned them.
    Loaded(Vec<R>),
    /// The last fetch failed; prior records were cleared.
    Failed(String),
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        CollectionState::Idle
    }
}

impl<R> CollectionState<R> {
    /// The records currently shown (empty when idle or failed).
    pub fn records(&self) -> &[R] {
        match self {
            CollectionState::Loading(records) | CollectionState::Loaded(records) => records,
            CollectionState::Idle | CollectionState::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CollectionState::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CollectionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn into_records(self) -> Vec<R> {
        match self {
            CollectionState::Loading(records) | CollectionState::Loaded(records) => records,
            CollectionState::Idle | CollectionState::Failed(_) => Vec::new(),
        }
    }
}

struct ListState<R, F, O> {
    collection: CollectionState<R>,
    filter: F,
    sort: O,
    pages: Option<Pagination>,
    /// Number of loads issued so far.
    issued: u64,
}

/// Owns one list view's records and view parameters.
///
/// Shared behind an `Arc`; every method takes `&self`. No lock is held across
/// an await point.
pub struct ListController<S: DataSource, F = NoFilter, O = NoSort> {
    source: Arc<S>,
    state: Mutex<ListState<S::Record, F, O>>,
    notifier: Arc<Notifier>,
}

impl<S: DataSource> ListController<S> {
    /// A controller that shows every record in server order.
    pub fn new(source: S) -> Self {
        Self::with_view(source, NoFilter, NoSort)
    }
}

impl<S, F, O> ListController<S, F, O>
where
    S: DataSource,
    F: Filter<S::Record>,
    O: Sort<S::Record>,
{
    pub fn with_view(source: S, filter: F, sort: O) -> Self {
        Self {
            source: Arc::new(source),
            state: Mutex::new(ListState {
                collection: CollectionState::Idle,
                filter,
                sort,
                pages: None,
                issued: 0,
            }),
            notifier: Arc::new(Notifier::new()),
        }
    }

    /// Enable pagination of the visible records.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().pages = Some(Pagination::new(page_size));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Register a change listener; see `Notifier::subscribe`.
    pub fn subscribe<L>(&self, listener: L) -> String
    where
        L: Fn(Change) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: &str) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ========================================================================
    // Load lifecycle
    // ========================================================================

    /// Snapshot of the collection state.
    pub fn state(&self) -> CollectionState<S::Record> {
        self.lock().collection.clone()
    }

    /// All records, unfiltered, in server order.
    pub fn records(&self) -> Vec<S::Record> {
        self.lock().collection.records().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().collection.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().collection.error().map(str::to_string)
    }

    /// Fetch the list and replace the records.
    ///
    /// Ends in `Loaded` or `Failed`. Overlapping loads each apply their own
    /// response when it arrives, so the last response to arrive wins.
    pub async fn load(&self) -> Result<usize, ControllerError> {
        let ticket = {
            let mut state = self.lock();
            state.issued += 1;
            let previous = std::mem::take(&mut state.collection).into_records();
            state.collection = CollectionState::Loading(previous);
            state.issued
        };
        self.notifier.notify(Change::Collection);
        tracing::debug!(kind = Self::kind(), ticket, "load started");

        let result = self.source.fetch_all().await;

        let outcome = {
            let mut state = self.lock();
            if ticket < state.issued {
                tracing::debug!(
                    kind = Self::kind(),
                    ticket,
                    latest = state.issued,
                    "applying response of a superseded load"
                );
            }
            match result {
                Ok(records) => {
                    let count = records.len();
                    tracing::debug!(kind = Self::kind(), count, "load finished");
                    state.collection = CollectionState::Loaded(records);
                    Ok(count)
                }
                Err(err) => {
                    let err = ControllerError::from(err);
                    tracing::warn!(kind = Self::kind(), error = %err, "load failed");
                    state.collection = CollectionState::Failed(err.user_message());
                    Err(err)
                }
            }
        };
        self.notifier.notify(Change::Collection);
        outcome
    }

    // ========================================================================
    // View parameters
    // ========================================================================

    /// Replace the filter. Resets pagination to the first page.
    pub fn set_filter(&self, filter: F) {
        self.update_filter(|current| *current = filter);
    }

    /// Edit the filter in place. Resets pagination to the first page.
    pub fn update_filter(&self, edit: impl FnOnce(&mut F)) {
        {
            let mut state = self.lock();
            edit(&mut state.filter);
            if let Some(pages) = state.pages.as_mut() {
                pages.reset();
            }
        }
        self.notifier.notify(Change::View);
    }

    pub fn filter(&self) -> F
    where
        F: Clone,
    {
        self.lock().filter.clone()
    }

    pub fn set_sort(&self, sort: O) {
        self.update_sort(|current| *current = sort);
    }

    pub fn update_sort(&self, edit: impl FnOnce(&mut O)) {
        edit(&mut self.lock().sort);
        self.notifier.notify(Change::View);
    }

    pub fn sort(&self) -> O
    where
        O: Clone,
    {
        self.lock().sort.clone()
    }

    /// Select a 1-based page. No-op without pagination.
    pub fn set_page(&self, page: usize) {
        let changed = match self.lock().pages.as_mut() {
            Some(pages) => {
                pages.set_page(page);
                true
            }
            None => false,
        };
        if changed {
            self.notifier.notify(Change::View);
        }
    }

    /// Current page, clamped to the visible records. Always 1 without pagination.
    pub fn page(&self) -> usize {
        let state = self.lock();
        match state.pages {
            Some(pages) => pages.effective_page(Self::compute_visible(&state).len()),
            None => 1,
        }
    }

    pub fn page_count(&self) -> usize {
        let state = self.lock();
        let total = Self::compute_visible(&state).len();
        match state.pages {
            Some(pages) => pages.page_count(total),
            None => usize::from(total > 0),
        }
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// `sort(filter(records))`, recomputed on every call.
    pub fn visible(&self) -> Vec<S::Record> {
        Self::compute_visible(&self.lock())
    }

    /// The current page of `visible()`, or all of it without pagination.
    pub fn visible_page(&self) -> Vec<S::Record> {
        let state = self.lock();
        let visible = Self::compute_visible(&state);
        match state.pages {
            Some(pages) => pages.slice(&visible).to_vec(),
            None => visible,
        }
    }

    /// Distinct values of one field across all records, ascending.
    pub fn distinct_values<V, K>(&self, key: K) -> Vec<V>
    where
        V: Ord,
        K: Fn(&S::Record) -> V,
    {
        self.lock()
            .collection
            .records()
            .iter()
            .map(key)
            .collect::<BTreeSet<V>>()
            .into_iter()
            .collect()
    }

    fn compute_visible(state: &ListState<S::Record, F, O>) -> Vec<S::Record> {
        let filtered = filter::apply(state.collection.records(), &state.filter);
        sort::apply(filtered, &state.sort)
    }

    // ========================================================================
    // Patching from confirmed mutations
    // ========================================================================

    /// Append a server-confirmed record to the end of the collection.
    pub(crate) fn append(&self, record: S::Record) {
        {
            let mut state = self.lock();
            match &mut state.collection {
                CollectionState::Loading(records) | CollectionState::Loaded(records) => {
                    records.push(record)
                }
                idle_or_failed => *idle_or_failed = CollectionState::Loaded(vec![record]),
            }
        }
        self.notifier.notify(Change::Collection);
    }

    /// Swap in a server-confirmed record by id. Returns false if no record has that id.
    pub(crate) fn replace(&self, record: S::Record) -> bool {
        let replaced = {
            let mut state = self.lock();
            let slot = match &mut state.collection {
                CollectionState::Loading(records) | CollectionState::Loaded(records) => {
                    records.iter_mut().find(|r| r.id() == record.id())
                }
                CollectionState::Idle | CollectionState::Failed(_) => None,
            };
            match slot {
                Some(slot) => {
                    *slot = record;
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.notifier.notify(Change::Collection);
        }
        replaced
    }

    fn kind() -> &'static str {
        <S::Record as Record>::KIND
    }

    fn lock(&self) -> MutexGuard<'_, ListState<S::Record, F, O>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
