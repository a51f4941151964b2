use thiserror::Error;

use crate::domain::RequiredField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

impl ValidationError {
    pub fn missing(&self) -> &[RequiredField] {
        match self {
            ValidationError::MissingFields(fields) => fields,
        }
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("calendar webhook transport failure: {0}")]
    Transport(String),
    #[error("calendar webhook rejected event with status {0}")]
    Status(u16),
    #[error("delivery task ended before reporting: {0}")]
    TaskFailed(String),
}
