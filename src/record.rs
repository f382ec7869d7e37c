//! Record - the entity type a list view manages.

use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be held by a `ListController`.
///
/// Only the id is interpreted by the controllers. Every other attribute is
/// reached through filter and sort values supplied by the caller.
///
/// ## Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Clone)]
/// struct Course {
///     pub course_id: i64,
///     pub title: String,
/// }
///
/// impl Record for Course {
///     type Id = i64;
///     const KIND: &'static str = "course";
///     fn id(&self) -> &i64 { &self.course_id }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The opaque unique key of a record.
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Human name of the entity kind ("course", "request"), used in prompts and messages.
    const KIND: &'static str;

    /// Returns the unique identifier for this record.
    fn id(&self) -> &Self::Id;

    /// Short label used in user-facing messages. Defaults to the id.
    fn label(&self) -> String {
        self.id().to_string()
    }
}

/// Capitalizes the first character of a kind name for sentence starts.
pub(crate) fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
