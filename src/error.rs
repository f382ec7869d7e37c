use std::error::Error;
use std::fmt;

use crate::source::SourceError;
use crate::validation::ValidationErrors;

/// Failures surfaced by the list and mutation controllers.
///
/// None of these is fatal: the controller stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The request could not complete, or its response could not be read.
    NetworkFailure(String),
    /// The backend refused the request; the message comes from the response body.
    ServerRejection(String),
    /// A client-side precondition failed before any request was sent.
    ValidationFailure(ValidationErrors),
}

impl ControllerError {
    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::NetworkFailure(msg) => write!(f, "{}", msg),
            ControllerError::ServerRejection(msg) => write!(f, "{}", msg),
            ControllerError::ValidationFailure(errors) => write!(f, "{}", errors),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ControllerError::ValidationFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for ControllerError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Rejected { message, .. } => ControllerError::ServerRejection(message),
            other @ (SourceError::Network(_) | SourceError::Decode(_)) => {
                ControllerError::NetworkFailure(other.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ControllerError {
    fn from(err: ValidationErrors) -> Self {
        ControllerError::ValidationFailure(err)
    }
}
