use thiserror::Error;

/// Errors raised by the checksum kernel on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    #[error("input is empty")]
    Empty,
    #[error("non-digit character {found:?} at position {position}")]
    NonDigit { position: usize, found: char },
    #[error("expected {expected} digits, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Errors emitted by the generator registry.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),
}

/// Reasons a value fails scheme validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected length {expected}, got {actual}")]
    Length { expected: String, actual: usize },
    #[error("malformed value: {0}")]
    Format(String),
    #[error("invalid date: {0}")]
    Date(String),
    #[error("check digit mismatch: expected {expected}, found {found}")]
    CheckDigit { expected: u8, found: u8 },
    #[error("unknown prefix: {0}")]
    Prefix(String),
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}
