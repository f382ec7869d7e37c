mod config;
pub mod domain;
mod error;
pub mod list;
mod message;
pub mod mutation;
mod observer;
mod record;
pub mod source;
mod validation;

pub use config::{ClientConfig, ConfigError};
pub use error::ControllerError;
pub use list::{CollectionState, ListController};
pub use message::{MessageKind, MessageSlot, TransientMessage};
pub use mutation::{Confirm, MutationController, Submission};
pub use observer::{Change, Notifier};
pub use record::Record;
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DataSource, Endpoints, InMemorySource, SourceError, WritableSource};
pub use validation::{FieldError, Validate, ValidationErrors};

// Re-export the EventEmitter from the event_emitter_rs crate
pub use event_emitter_rs::EventEmitter;
