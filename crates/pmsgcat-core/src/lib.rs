//! Core decoder for Android pmsg (persistent message store) log files.
//!
//! A pmsg file is a sequence of binary entries: a fixed 20-byte little-endian
//! header (entry length, header size, pid, tid, seconds, nanoseconds)
//! followed by a variable payload (priority byte, NUL-terminated tag,
//! NUL-terminated message). This crate turns such a byte stream into an
//! ordered list of [`LogRecord`] values plus a list of [`Diagnostic`]
//! findings, decoded in layers: `source` frames the stream, `entry` parses
//! bytes (layout/reader/parser), `decode` drives the loop and applies the
//! recovery policy. Parsing is byte-oriented and side-effect free; all I/O is
//! isolated in the source layer.
//!
//! Invariants:
//! - Every record corresponds to exactly one frame; source order is kept.
//! - Malformed input degrades to diagnostics and partial results, never a
//!   panic or an unbounded loop.
//! - The decoder holds no state between calls; independent calls may run on
//!   separate threads without coordination.
//!
//! # Examples
//! ```
//! use std::io::Cursor;
//!
//! use pmsgcat_core::{DecodeOptions, Priority, decode_pmsg_stream};
//!
//! // One entry: entry_len=32, header_size=20, pid=100, tid=200, ts 0,
//! // payload = priority 4 (Info), tag "TestTag", message "Hi".
//! let mut bytes = Vec::new();
//! bytes.extend_from_slice(&32u16.to_le_bytes());
//! bytes.extend_from_slice(&20u16.to_le_bytes());
//! bytes.extend_from_slice(&100i32.to_le_bytes());
//! bytes.extend_from_slice(&200i32.to_le_bytes());
//! bytes.extend_from_slice(&[0u8; 8]);
//! bytes.extend_from_slice(b"\x04TestTag\0Hi\0");
//!
//! let log = decode_pmsg_stream(Cursor::new(bytes), DecodeOptions::default());
//! assert_eq!(log.records.len(), 1);
//! assert_eq!(log.records[0].level, Priority::Info);
//! assert_eq!(log.records[0].tag.as_deref(), Some("TestTag"));
//! assert_eq!(log.records[0].message, "Hi");
//! ```

use std::fmt;

use serde::{Serialize, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

mod decode;
mod entry;
mod source;

pub use decode::{DecodeError, DecodeOptions, decode_pmsg_file, decode_pmsg_stream};
pub use entry::EntryHeader;
pub use source::{FrameCursor, FrameError, HeaderStep};

/// Log priority, mapped from the payload's leading code byte.
///
/// Codes 2 through 7 map to the six logcat levels. Any other code is carried
/// through as [`Priority::Other`] and renders as its decimal form;
/// [`Priority::Unknown`] marks header-only entries that carried no payload at
/// all.
///
/// # Examples
/// ```
/// use pmsgcat_core::Priority;
///
/// assert_eq!(Priority::from_code(4), Priority::Info);
/// assert_eq!(Priority::Info.to_string(), "I");
/// assert_eq!(Priority::from_code(9).to_string(), "9");
/// assert_eq!(Priority::Unknown.to_string(), "?");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// A code outside the known 2..=7 range, kept verbatim.
    Other(u8),
    /// Header-only entry: the payload carried no priority byte.
    Unknown,
}

impl Priority {
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => Priority::Verbose,
            3 => Priority::Debug,
            4 => Priority::Info,
            5 => Priority::Warn,
            6 => Priority::Error,
            7 => Priority::Fatal,
            other => Priority::Other(other),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Verbose => f.write_str("V"),
            Priority::Debug => f.write_str("D"),
            Priority::Info => f.write_str("I"),
            Priority::Warn => f.write_str("W"),
            Priority::Error => f.write_str("E"),
            Priority::Fatal => f.write_str("F"),
            Priority::Other(code) => write!(f, "{code}"),
            Priority::Unknown => f.write_str("?"),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One decoded log entry.
///
/// # Examples
/// ```
/// use pmsgcat_core::{LogRecord, Priority};
/// use time::OffsetDateTime;
///
/// let record = LogRecord {
///     timestamp: OffsetDateTime::UNIX_EPOCH,
///     pid: 100,
///     tid: 200,
///     level: Priority::Info,
///     tag: Some("ActivityManager".to_string()),
///     message: "Displayed activity".to_string(),
/// };
/// assert_eq!(record.level.to_string(), "I");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Entry timestamp: header seconds plus `nsec / 1000` microseconds after
    /// the Unix epoch (UTC). Serializes as an RFC 3339 string.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: OffsetDateTime,
    pub pid: i32,
    pub tid: i32,
    pub level: Priority,
    /// `None` for header-only entries; `Some("ErrorTag")` when the payload
    /// carried no tag terminator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub message: String,
}

/// Diagnostic severity. `Note` entries are verbose-only detail; `Warning` and
/// `Error` are always emitted.
///
/// # Examples
/// ```
/// use pmsgcat_core::Severity;
///
/// assert_eq!(Severity::Warning.label(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One finding from the decode loop: what happened, how bad it is, and the
/// byte offset it was observed at. Diagnostics are ordered by offset, which
/// also orders them relative to the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub offset: u64,
    pub message: String,
}

/// Result of one decode call: records in source order plus the diagnostic
/// side-channel.
///
/// A stream-fatal fault still yields the cleanly parsed prefix, so an empty
/// `records` list is not by itself a failure; check [`DecodedLog::has_errors`]
/// or inspect `diagnostics`.
///
/// # Examples
/// ```
/// use pmsgcat_core::DecodedLog;
///
/// let log = DecodedLog::default();
/// assert!(log.records.is_empty());
/// assert!(!log.has_errors());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecodedLog {
    pub records: Vec<LogRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedLog {
    /// True when any diagnostic has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp.format(&Rfc3339) {
        Ok(text) => serializer.serialize_str(&text),
        Err(err) => Err(serde::ser::Error::custom(err)),
    }
}
