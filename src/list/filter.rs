//! Filter predicates and the building blocks domain filters are made of.

/// A client-side predicate over records.
///
/// All active conditions of a filter are ANDed. A filter with no active
/// condition must match every record.
pub trait Filter<R>: Send + Sync {
    fn matches(&self, record: &R) -> bool;
}

/// Matches every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl<R> Filter<R> for NoFilter {
    fn matches(&self, _record: &R) -> bool {
        true
    }
}

/// Case-insensitive substring query over a set of text fields.
///
/// An empty (or blank) query is inactive and matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    needle: String,
}

impl TextQuery {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    /// True if the query is inactive or occurs in any of `fields`.
    pub fn matches_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        !self.is_active()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// A categorical selector: either the "all" sentinel or one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(chosen) => chosen == value,
        }
    }
}

impl Choice<String> {
    /// Parse a selector value where `"all"` (or an empty value) is the sentinel.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Choice::All,
            other => Choice::Only(other.to_string()),
        }
    }

    /// Case-insensitive variant of `admits` for status strings.
    pub fn admits_ignore_case(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(chosen) => chosen.eq_ignore_ascii_case(value),
        }
    }
}

/// Tri-state selector over a boolean field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tristate {
    #[default]
    All,
    TrueOnly,
    FalseOnly,
}

impl Tristate {
    pub fn admits(self, value: bool) -> bool {
        match self {
            Tristate::All => true,
            Tristate::TrueOnly => value,
            Tristate::FalseOnly => !value,
        }
    }
}

/// Apply a filter, keeping the input order.
pub fn apply<R: Clone, F: Filter<R> + ?Sized>(records: &[R], filter: &F) -> Vec<R> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
