use crate::error::PollError;
use crate::models::{OptionIndex, MAX_OPTIONS};

pub const MIN_OPTIONS: usize = 1;
pub const OPTION_FIELD_PREFIX: &str = "option";

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Poll question must not be empty")]
    EmptyQuestion,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Password must not be empty")]
    EmptyPassword,
}

pub fn validate_poll_request(question: &str, options: &[String]) -> Result<(), ValidationError> {
    if question.trim().is_empty() { return Err(ValidationError::EmptyQuestion); }
    if options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }

    let populated = options.iter().filter(|opt| !opt.trim().is_empty()).count();
    if populated < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    Ok(())
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() { return Err(ValidationError::EmptyUsername); }
    if password.is_empty() { return Err(ValidationError::EmptyPassword); }
    Ok(())
}

/// Parses a poll identifier taken from a URL segment.
pub fn parse_poll_id(id: &str) -> Result<u32, PollError> {
    match id.trim().parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(PollError::InvalidId),
    }
}

/// Reads a vote selection. Only the field names `option1`..`option42` are
/// accepted, spelled exactly as the poll page renders them.
pub fn parse_option_selection(selection: &str) -> Result<usize, PollError> {
    option_field_index(selection)
        .map(OptionIndex::get)
        .ok_or(PollError::InvalidOption)
}

/// Maps a form field name like `option12` to its slot.
pub fn option_field_index(field: &str) -> Option<OptionIndex> {
    field
        .strip_prefix(OPTION_FIELD_PREFIX)
        .filter(|digits| !digits.starts_with('0'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .and_then(OptionIndex::new)
}
