use thiserror::Error;

/// Errors returned by entry parsing and reading.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry data too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
