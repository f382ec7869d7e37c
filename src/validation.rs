//! Client-side validation of creation drafts.

use std::fmt;

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors of one draft. Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Require a non-blank value of at most `max_len` characters.
    ///
    /// The length counts the value as given, padding included.
    pub fn require(&mut self, field: &'static str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required", field));
        } else if value.chars().count() > max_len {
            self.push(
                field,
                format!("{} must be at most {} characters", field, max_len),
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The message for one field, for inline display next to the input.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by creation drafts. Runs before any request is sent.
pub trait Validate {
    /// Clean up user input (trim padding and the like) before validation.
    /// The normalized draft is the one sent to the backend.
    fn normalize(&mut self) {}

    fn validate(&self) -> Result<(), ValidationErrors>;
}
