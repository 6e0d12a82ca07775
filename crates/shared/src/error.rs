use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Step-validation failures. All are recoverable by correcting input and advancing again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Please select a drink category")]
    MissingCategory,
    #[error("Please select your mood")]
    MissingMood,
    #[error("Name is required")]
    MissingName,
    #[error("Please select a pickup time")]
    MissingPickupTime,
}

/// Where a validation message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorField {
    /// Steps without an inline error slot surface the message as a blocking prompt.
    Prompt,
    Name,
    PickupTime,
}

impl ValidationError {
    pub fn field(self) -> ErrorField {
        match self {
            ValidationError::MissingCategory | ValidationError::MissingMood => ErrorField::Prompt,
            ValidationError::MissingName => ErrorField::Name,
            ValidationError::MissingPickupTime => ErrorField::PickupTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("step {step} is incomplete: {}", describe(.errors))]
pub struct ValidationFailure {
    pub step: u8,
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn contains(&self, error: ValidationError) -> bool {
        self.errors.contains(&error)
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rejected input for a customization or catalog value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option group '{0}'")]
    UnknownOption(String),
    #[error("unknown {option} value '{value}'")]
    UnknownValue { option: String, value: String },
    #[error("drink category must not be empty")]
    EmptyCategory,
    #[error("invalid price '{0}'")]
    InvalidPrice(String),
}
