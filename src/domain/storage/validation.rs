//! Document identifier validation

use thiserror::Error;

/// Errors that can occur when validating a document identifier
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdValidationError {
    #[error("{0} ID cannot be empty")]
    Empty(&'static str),

    #[error("{0} ID cannot exceed {1} bytes")]
    TooLong(&'static str, usize),

    #[error("{0} ID cannot contain '/', whitespace or control characters")]
    InvalidCharacters(&'static str),

    #[error("{0} ID cannot be '.' or '..'")]
    Reserved(&'static str),

    #[error("{0} ID cannot contain control characters")]
    ControlCharacters(&'static str),
}

const MAX_ID_BYTES: usize = 128;

/// Validate an identifier used as a document key
///
/// `kind` names the identifier in error messages ("Member", "Actor", ...).
pub fn validate_document_id(kind: &'static str, id: &str) -> Result<(), IdValidationError> {
    if id.is_empty() {
        return Err(IdValidationError::Empty(kind));
    }

    if id.len() > MAX_ID_BYTES {
        return Err(IdValidationError::TooLong(kind, MAX_ID_BYTES));
    }

    if id
        .chars()
        .any(|c| c == '/' || c.is_whitespace() || c.is_control())
    {
        return Err(IdValidationError::InvalidCharacters(kind));
    }

    if id == "." || id == ".." {
        return Err(IdValidationError::Reserved(kind));
    }

    Ok(())
}
