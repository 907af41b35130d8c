use thiserror::Error;

use crate::entry::EntryError;
use crate::entry::layout;

/// Framing faults. Every variant carries the byte offset it was observed at;
/// `Io` stays distinct from the structural variants because the two decode
/// entry points treat I/O faults differently.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("incomplete entry header prefix at offset {offset}: got {got} of {} bytes", layout::PREFIX_LEN)]
    TruncatedPrefix { offset: u64, got: usize },
    #[error("incomplete entry header at offset {offset}: got {got} of {expected} bytes")]
    TruncatedHeader {
        offset: u64,
        expected: usize,
        got: usize,
    },
    #[error("entry length {entry_len} at offset {offset} is smaller than the fixed {}-byte header", layout::HEADER_LEN)]
    EntryTooShort { offset: u64, entry_len: u16 },
    #[error("incomplete payload at offset {offset}: got {got} of {expected} bytes")]
    TruncatedPayload {
        offset: u64,
        expected: usize,
        got: usize,
    },
    #[error("invalid entry header at offset {offset}: {source}")]
    Header {
        offset: u64,
        #[source]
        source: EntryError,
    },
}

impl FrameError {
    /// Byte offset the fault was observed at.
    pub fn offset(&self) -> u64 {
        match self {
            FrameError::Io { offset, .. }
            | FrameError::TruncatedPrefix { offset, .. }
            | FrameError::TruncatedHeader { offset, .. }
            | FrameError::EntryTooShort { offset, .. }
            | FrameError::TruncatedPayload { offset, .. }
            | FrameError::Header { offset, .. } => *offset,
        }
    }
}
