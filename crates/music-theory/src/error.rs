use thiserror::Error;

/// Errors from parsing or constructing theory values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("unknown note spelling: {0:?}")]
    UnknownNote(String),

    #[error("unknown chord quality: {0:?}")]
    UnknownQuality(String),

    #[error("unknown scale type: {0:?}")]
    UnknownScale(String),

    #[error("unknown spelling preference: {0:?}")]
    UnknownSpelling(String),

    #[error("malformed chord symbol: {0:?}")]
    MalformedSymbol(String),
}
