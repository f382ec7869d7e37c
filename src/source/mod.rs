//! Data sources - where list controllers read records from and send mutations to.
//!
//! A `DataSource` provides the read contract (fetch the whole list). A
//! `WritableSource` adds creation and state transitions. Two implementations
//! ship with the crate:
//!
//! - `InMemorySource` backs the search pages that run on mock data and the tests.
//! - `HttpSource` (requires the `http` feature) talks to the JSON backend.
//!
//! Controllers are generic over the source, so swapping one for the other does
//! not touch controller code.

mod in_memory;
#[cfg(feature = "http")]
mod http;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use url::Url;

use crate::record::Record;

pub use in_memory::InMemorySource;
#[cfg(feature = "http")]
pub use http::HttpSource;

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request could not complete (connection refused, timeout, ...).
    Network(String),
    /// The backend answered with a non-success status.
    Rejected {
        /// HTTP-style status code, when the source has one.
        status: Option<u16>,
        /// Message taken verbatim from the response body, or a fallback.
        message: String,
    },
    /// The response body could not be decoded into the expected shape.
    Decode(String),
}

impl SourceError {
    /// A rejection without a status code (used by in-memory sources).
    pub fn rejected(message: impl Into<String>) -> Self {
        SourceError::Rejected {
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Network(msg) => write!(f, "network error: {}", msg),
            SourceError::Rejected { message, .. } => write!(f, "{}", message),
            SourceError::Decode(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

/// Read contract shared by every list view.
pub trait DataSource: Send + Sync + 'static {
    /// The record type this source yields.
    type Record: Record;

    /// Fetch the full list, in the order the backend returns it.
    fn fetch_all(&self)
        -> impl Future<Output = Result<Vec<Self::Record>, SourceError>> + Send;
}

/// Write contract for list views that create records or move them between states.
pub trait WritableSource: DataSource {
    /// Creation payload sent to the backend.
    type Draft: Serialize + Send + Sync;

    /// Create a record; resolves to the canonical record the backend stored.
    fn create(
        &self,
        draft: &Self::Draft,
    ) -> impl Future<Output = Result<Self::Record, SourceError>> + Send;

    /// Apply a named action (`approve`, `reject`, `deactivate`, ...) to one record;
    /// resolves to the updated record.
    fn transition(
        &self,
        id: &<Self::Record as Record>::Id,
        action: &str,
    ) -> impl Future<Output = Result<Self::Record, SourceError>> + Send;
}

/// Backend paths for one resource, relative to the configured base URL.
///
/// The transition path is a template: `{id}` and `{action}` are substituted,
/// each percent-encoded as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub list: String,
    pub create: Option<String>,
    pub transition: Option<String>,
}

impl Endpoints {
    /// Endpoints for a read-only resource.
    pub fn read_only(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            create: None,
            transition: None,
        }
    }

    /// Set the creation path.
    pub fn with_create(mut self, path: impl Into<String>) -> Self {
        self.create = Some(path.into());
        self
    }

    /// Set the transition path template.
    pub fn with_transition(mut self, template: impl Into<String>) -> Self {
        self.transition = Some(template.into());
        self
    }

    /// Render the transition path for one record and action.
    pub fn transition_path(&self, id: &impl fmt::Display, action: &str) -> Option<String> {
        let template = self.transition.as_ref()?;
        Some(
            template
                .replace("{id}", &path_segment(&id.to_string())?)
                .replace("{action}", &path_segment(action)?),
        )
    }
}

/// Percent-encode `raw` so it stays one path segment (`/`, spaces, `?`, `#`, `%`).
fn path_segment(raw: &str) -> Option<String> {
    let mut url = Url::parse("http://localhost/").ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(raw);
    Some(url.path().trim_start_matches('/').to_string())
}
