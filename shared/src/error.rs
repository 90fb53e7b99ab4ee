use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Poll,
    Account,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Poll => f.write_str("Poll"),
            Resource::Account => f.write_str("Account"),
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PollError {
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("Invalid poll ID")]
    InvalidId,
    #[error("Invalid option")]
    InvalidOption,
    #[error("You have already voted for this poll")]
    AlreadyVoted,
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Wrong password")]
    WrongPassword,
    #[error("Poll {0} already exists")]
    DuplicateId(u32),
    #[error("No poll ids left")]
    IdsExhausted,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValidationError> for PollError {
    fn from(err: ValidationError) -> Self {
        PollError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
