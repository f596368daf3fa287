//! Validation failures raised before anything reaches storage.

use thiserror::Error;

/// A required field was blank, or a form operation referenced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("recipe name must not be blank")]
    BlankName,

    #[error("step description must not be blank")]
    BlankStepDescription,

    #[error("step duration must not be blank")]
    BlankStepDuration,

    #[error("a recipe needs at least one step")]
    NoSteps,

    #[error("no step at position {0}")]
    NoSuchStep(u32),

    #[error("Please enter a recipe name")]
    BlankQuery,
}

/// Trim `name` and reject it when nothing is left.
pub(crate) fn require_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::BlankName)
    } else {
        Ok(trimmed)
    }
}
