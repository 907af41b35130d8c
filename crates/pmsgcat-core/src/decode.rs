//! Stream driver: repeats header framing and payload decoding until EOF or a
//! fatal condition, accumulating records and diagnostics.
//!
//! Recovery policy: anomalies either advance past the declared entry length
//! (when `entry_len` itself is trustworthy) or halt the whole decode (when the
//! framing is suspect). Frames are never retried and the cursor never
//! resynchronizes by guesswork; a halted decode still returns every record
//! parsed before the fault.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::entry::{self, layout};
use crate::source::{FrameCursor, FrameError, HeaderStep};
use crate::{DecodedLog, Diagnostic, LogRecord, Severity};

/// Hard failures escaping [`decode_pmsg_file`]. Everything else degrades to
/// diagnostics and partial results.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode configuration.
///
/// `verbose` adds [`Severity::Note`] diagnostics (per-entry field dumps, skip
/// notices). It does not change which records are produced, with one inherited
/// exception: a negative computed payload length is skipped in verbose mode
/// but halts the decode otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub verbose: bool,
}

/// Decode a pmsg log file by path.
///
/// The file is opened and read by the decoder, so I/O faults (not-found,
/// permission, read errors) propagate as [`DecodeError::Io`]. Malformed
/// content never fails the call; it is reported through
/// [`DecodedLog::diagnostics`].
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use pmsgcat_core::{DecodeOptions, decode_pmsg_file};
///
/// let log = decode_pmsg_file(Path::new("/sys/fs/pstore/pmsg-ramoops-0"), DecodeOptions::default())?;
/// println!("{} records", log.records.len());
/// # Ok::<(), pmsgcat_core::DecodeError>(())
/// ```
pub fn decode_pmsg_file(path: &Path, options: DecodeOptions) -> Result<DecodedLog, DecodeError> {
    let file = File::open(path)?;
    let (log, io_fault) = decode_frames(FrameCursor::new(BufReader::new(file)), options);
    match io_fault {
        Some((_, err)) => Err(DecodeError::Io(err)),
        None => Ok(log),
    }
}

/// Decode a caller-supplied byte stream.
///
/// The caller owns the stream's lifecycle, so I/O faults are absorbed: they
/// become an error diagnostic and the call returns whatever was parsed before
/// the fault. The signature is infallible by design.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use pmsgcat_core::{DecodeOptions, decode_pmsg_stream};
///
/// let log = decode_pmsg_stream(Cursor::new(Vec::new()), DecodeOptions::default());
/// assert!(log.records.is_empty());
/// assert!(!log.has_errors());
/// ```
pub fn decode_pmsg_stream<R: Read>(reader: R, options: DecodeOptions) -> DecodedLog {
    let (mut log, io_fault) = decode_frames(FrameCursor::new(reader), options);
    if let Some((offset, err)) = io_fault {
        push(&mut log, Severity::Error, offset, format!("I/O error: {err}"));
    }
    log
}

fn decode_frames<R: Read>(
    mut cursor: FrameCursor<R>,
    options: DecodeOptions,
) -> (DecodedLog, Option<(u64, io::Error)>) {
    let mut log = DecodedLog::default();

    loop {
        match cursor.next_header() {
            Ok(HeaderStep::Eof) => break,
            Ok(HeaderStep::Padding { offset }) => {
                if options.verbose {
                    push(&mut log, Severity::Note, offset, "skipping zero-length entry");
                }
            }
            Ok(HeaderStep::Entry { offset, header }) => {
                let payload_len = i64::from(header.entry_len) - layout::HEADER_LEN as i64;
                if options.verbose {
                    push(
                        &mut log,
                        Severity::Note,
                        offset,
                        format!(
                            "entry_len={} header_size={} pid={} tid={} sec={} nsec={} payload_len={payload_len}",
                            header.entry_len, header.header_size, header.pid, header.tid, header.sec, header.nsec
                        ),
                    );
                }

                // Unreachable while next_header rejects entry_len < HEADER_LEN;
                // kept so relaxing that check can never turn into a bogus read.
                if payload_len < 0 {
                    if options.verbose {
                        push(
                            &mut log,
                            Severity::Warning,
                            offset,
                            format!(
                                "negative payload length {payload_len} for entry_len {}; skipping entry",
                                header.entry_len
                            ),
                        );
                        continue;
                    }
                    push(
                        &mut log,
                        Severity::Error,
                        offset,
                        format!(
                            "negative payload length {payload_len} for entry_len {}; stopping",
                            header.entry_len
                        ),
                    );
                    break;
                }

                let payload_offset = offset + layout::HEADER_LEN as u64;
                let payload = match cursor.read_payload(payload_len as usize) {
                    Ok(payload) => payload,
                    Err(FrameError::Io { offset, source }) => return (log, Some((offset, source))),
                    Err(err) => {
                        push(&mut log, Severity::Error, err.offset(), err.to_string());
                        break;
                    }
                };

                if options.verbose && payload.is_empty() {
                    push(&mut log, Severity::Note, offset, "entry has no payload");
                }

                match entry::parse_payload(&payload) {
                    Ok(parts) => {
                        if parts.tag_unterminated {
                            push(
                                &mut log,
                                Severity::Warning,
                                payload_offset,
                                format!(
                                    "no NUL terminator for tag (pid {}); tag will be '{}'",
                                    header.pid,
                                    layout::FALLBACK_TAG
                                ),
                            );
                        }
                        log.records.push(LogRecord {
                            timestamp: entry_timestamp(header.sec, header.nsec),
                            pid: header.pid,
                            tid: header.tid,
                            level: parts.level,
                            tag: parts.tag,
                            message: parts.message,
                        });
                    }
                    Err(err) => {
                        push(
                            &mut log,
                            Severity::Error,
                            payload_offset,
                            format!("skipping entry: {err}"),
                        );
                    }
                }
            }
            Err(FrameError::Io { offset, source }) => return (log, Some((offset, source))),
            Err(err) => {
                push(&mut log, Severity::Error, err.offset(), err.to_string());
                break;
            }
        }
    }

    (log, None)
}

fn push(log: &mut DecodedLog, severity: Severity, offset: u64, message: impl Into<String>) {
    log.diagnostics.push(Diagnostic {
        severity,
        offset,
        message: message.into(),
    });
}

/// `sec` seconds since the epoch plus `nsec / 1000` microseconds. Nanoseconds
/// truncate toward the covering microsecond; they are not rounded.
fn entry_timestamp(sec: u32, nsec: u32) -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
        + Duration::seconds(i64::from(sec))
        + Duration::microseconds(i64::from(nsec / 1_000))
}

#[cfg(test)]
mod tests {
    use super::entry_timestamp;

    #[test]
    fn timestamp_truncates_nanoseconds_to_microseconds() {
        let ts = entry_timestamp(10, 123_456_789);
        assert_eq!(ts.unix_timestamp(), 10);
        assert_eq!(ts.microsecond(), 123_456);
    }

    #[test]
    fn timestamp_for_epoch_is_epoch() {
        let ts = entry_timestamp(0, 0);
        assert_eq!(ts, time::OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn timestamp_nsec_999_truncates_to_zero_microseconds() {
        let ts = entry_timestamp(5, 999);
        assert_eq!(ts.unix_timestamp(), 5);
        assert_eq!(ts.microsecond(), 0);
    }
}
