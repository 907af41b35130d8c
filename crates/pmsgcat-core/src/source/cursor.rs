use std::io::{ErrorKind, Read};

use crate::entry::{self, layout};

use super::HeaderStep;
use super::error::FrameError;

/// Cursor over a byte source, yielding one entry header (or padding marker)
/// per step. The cursor never seeks; it tracks its own offset so diagnostic
/// positions stay accurate even on non-seekable sources.
pub struct FrameCursor<R: Read> {
    reader: R,
    offset: u64,
}

impl<R: Read> FrameCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Current byte offset, i.e. the position of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Advance past the next fixed header.
    ///
    /// Reading zero bytes at a frame boundary is a clean EOF; reading a
    /// partial prefix or partial header is a truncation fault. A zero
    /// `entry_len` consumes only the 4 prefix bytes and yields
    /// [`HeaderStep::Padding`].
    pub fn next_header(&mut self) -> Result<HeaderStep, FrameError> {
        let start = self.offset;
        let mut header = [0u8; layout::HEADER_LEN];

        let got = self.fill(&mut header[..layout::PREFIX_LEN])?;
        if got == 0 {
            return Ok(HeaderStep::Eof);
        }
        if got < layout::PREFIX_LEN {
            return Err(FrameError::TruncatedPrefix { offset: start, got });
        }

        let (entry_len, _header_size) = entry::parse_prefix(&header[..layout::PREFIX_LEN])
            .map_err(|source| FrameError::Header {
                offset: start,
                source,
            })?;

        if entry_len == 0 {
            return Ok(HeaderStep::Padding { offset: start });
        }
        if usize::from(entry_len) < layout::HEADER_LEN {
            return Err(FrameError::EntryTooShort {
                offset: start,
                entry_len,
            });
        }

        let expected = layout::HEADER_LEN - layout::PREFIX_LEN;
        let got = self.fill(&mut header[layout::PREFIX_LEN..])?;
        if got < expected {
            return Err(FrameError::TruncatedHeader {
                offset: start,
                expected,
                got,
            });
        }

        let header = entry::parse_header(&header).map_err(|source| FrameError::Header {
            offset: start,
            source,
        })?;
        Ok(HeaderStep::Entry {
            offset: start,
            header,
        })
    }

    /// Read exactly `len` payload bytes following a header.
    pub fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, FrameError> {
        let start = self.offset;
        let mut payload = vec![0u8; len];
        let got = self.fill(&mut payload)?;
        if got < len {
            return Err(FrameError::TruncatedPayload {
                offset: start,
                expected: len,
                got,
            });
        }
        Ok(payload)
    }

    /// Read until `buf` is full or the source is exhausted; returns the byte
    /// count actually read. Interrupted reads are retried.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, FrameError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.offset += n as u64;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(FrameError::Io {
                        offset: self.offset,
                        source,
                    });
                }
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::FrameCursor;
    use crate::source::{FrameError, HeaderStep};

    fn header_bytes(entry_len: u16) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&entry_len.to_le_bytes());
        bytes.extend_from_slice(&20u16.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes
    }

    #[test]
    fn empty_source_is_clean_eof() {
        let mut cursor = FrameCursor::new(Cursor::new(Vec::new()));
        assert_eq!(cursor.next_header().unwrap(), HeaderStep::Eof);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn partial_prefix_is_truncation() {
        let mut cursor = FrameCursor::new(Cursor::new(vec![0x14, 0x00, 0x14]));
        let err = cursor.next_header().unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedPrefix { offset: 0, got: 3 }
        ));
    }

    #[test]
    fn zero_length_entry_is_padding_and_consumes_prefix_only() {
        let mut bytes = vec![0u8; 4];
        bytes.extend_from_slice(&header_bytes(20));
        let mut cursor = FrameCursor::new(Cursor::new(bytes));

        assert_eq!(cursor.next_header().unwrap(), HeaderStep::Padding { offset: 0 });
        assert_eq!(cursor.offset(), 4);

        match cursor.next_header().unwrap() {
            HeaderStep::Entry { offset, header } => {
                assert_eq!(offset, 4);
                assert_eq!(header.entry_len, 20);
                assert_eq!(header.pid, 1);
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn entry_len_below_header_size_is_fatal() {
        let mut cursor = FrameCursor::new(Cursor::new(header_bytes(19)));
        let err = cursor.next_header().unwrap_err();
        assert!(matches!(
            err,
            FrameError::EntryTooShort {
                offset: 0,
                entry_len: 19
            }
        ));
    }

    #[test]
    fn partial_header_is_truncation() {
        let mut cursor = FrameCursor::new(Cursor::new(header_bytes(24)[..12].to_vec()));
        let err = cursor.next_header().unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedHeader {
                offset: 0,
                expected: 16,
                got: 8
            }
        ));
    }

    #[test]
    fn payload_short_read_is_truncation() {
        let mut bytes = header_bytes(24);
        bytes.extend_from_slice(b"\x04T");
        let mut cursor = FrameCursor::new(Cursor::new(bytes));
        cursor.next_header().unwrap();

        let err = cursor.read_payload(4).unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedPayload {
                offset: 20,
                expected: 4,
                got: 2
            }
        ));
    }

    #[test]
    fn payload_read_advances_offset() {
        let mut bytes = header_bytes(24);
        bytes.extend_from_slice(b"\x04T\0\0");
        let mut cursor = FrameCursor::new(Cursor::new(bytes));
        cursor.next_header().unwrap();

        let payload = cursor.read_payload(4).unwrap();
        assert_eq!(payload, b"\x04T\0\0");
        assert_eq!(cursor.offset(), 24);
        assert_eq!(cursor.next_header().unwrap(), HeaderStep::Eof);
    }
}
