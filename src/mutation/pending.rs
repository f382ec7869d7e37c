use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observer::{Change, Notifier};

/// Ids with a mutation in flight. An id is held at most once.
pub(crate) struct PendingSet<K> {
    ids: Mutex<HashSet<K>>,
    notifier: Arc<Notifier>,
}

impl<K: Clone + Eq + Hash> PendingSet<K> {
    pub(crate) fn new(notifier: Arc<Notifier>) -> Self {
        Self {
            ids: Mutex::new(HashSet::new()),
            notifier,
        }
    }

    /// Claim `id`; `None` if it is already claimed.
    pub(crate) fn try_claim(&self, id: &K) -> Option<PendingClaim<'_, K>> {
        if !self.lock().insert(id.clone()) {
            return None;
        }
        self.notifier.notify(Change::Pending);
        Some(PendingClaim {
            set: self,
            id: id.clone(),
        })
    }

    pub(crate) fn contains(&self, id: &K) -> bool {
        self.lock().contains(id)
    }

    pub(crate) fn snapshot(&self) -> Vec<K> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its id when dropped, including when the owning future is dropped.
pub(crate) struct PendingClaim<'a, K: Clone + Eq + Hash> {
    set: &'a PendingSet<K>,
    id: K,
}

impl<K: Clone + Eq + Hash> Drop for PendingClaim<'_, K> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
        self.set.notifier.notify(Change::Pending);
    }
}

/// Single in-flight flag for creation.
pub(crate) struct CreateFlag {
    busy: AtomicBool,
    notifier: Arc<Notifier>,
}

impl CreateFlag {
    pub(crate) fn new(notifier: Arc<Notifier>) -> Self {
        Self {
            busy: AtomicBool::new(false),
            notifier,
        }
    }

    pub(crate) fn try_claim(&self) -> Option<CreateClaim<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.notifier.notify(Change::Pending);
        Some(CreateClaim { flag: self })
    }

    pub(crate) fn is_set(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub(crate) struct CreateClaim<'a> {
    flag: &'a CreateFlag,
}

impl Drop for CreateClaim<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
        self.flag.notifier.notify(Change::Pending);
    }
}
