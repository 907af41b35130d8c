//! Byte-source framing.
//!
//! [`FrameCursor`] wraps any readable byte source, owns the monotonically
//! advancing byte offset, and splits the stream into entry-sized steps. All
//! diagnostic offsets reported by the decoder come from this bookkeeping, so
//! nothing else may read from or reposition the underlying source while a
//! cursor borrows it.

mod cursor;
mod error;

pub use cursor::FrameCursor;
pub use error::FrameError;

use crate::entry::EntryHeader;

/// One framing step produced by [`FrameCursor::next_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStep {
    /// A complete fixed header; `offset` is the frame's first byte.
    Entry { offset: u64, header: EntryHeader },
    /// A zero-length entry: padding, consumed and never surfaced as a record.
    Padding { offset: u64 },
    /// Clean end of stream, reached exactly on a frame boundary.
    Eof,
}
