//! Sort comparators.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A client-side ordering over records. Sorting with it is always stable.
pub trait Sort<R>: Send + Sync {
    fn compare(&self, a: &R, b: &R) -> Ordering;
}

/// Keeps the server order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoSort;

impl<R> Sort<R> for NoSort {
    fn compare(&self, _a: &R, _b: &R) -> Ordering {
        Ordering::Equal
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Records that sit in a review queue.
pub trait Queued {
    /// True while the record awaits a decision.
    fn is_pending(&self) -> bool;

    /// Submission time. `None` when missing or unparseable.
    fn submitted_at(&self) -> Option<NaiveDateTime>;
}

/// Pending records first, then by submission time in `direction`.
///
/// Records without a usable timestamp count as the oldest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingFirst {
    pub direction: SortDirection,
}

impl PendingFirst {
    pub fn new(direction: SortDirection) -> Self {
        Self { direction }
    }
}

impl<R: Queued> Sort<R> for PendingFirst {
    fn compare(&self, a: &R, b: &R) -> Ordering {
        b.is_pending()
            .cmp(&a.is_pending())
            .then_with(|| self.direction.apply(a.submitted_at().cmp(&b.submitted_at())))
    }
}

/// Parse a backend timestamp: RFC 3339, a naive ISO date-time, or a plain date.
///
/// Offsets are normalized to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Stable sort into a new vector.
pub fn apply<R: Clone, S: Sort<R> + ?Sized>(mut records: Vec<R>, sort: &S) -> Vec<R> {
    records.sort_by(|a, b| sort.compare(a, b));
    records
}
