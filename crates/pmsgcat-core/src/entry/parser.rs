use crate::Priority;

use super::error::EntryError;
use super::layout;
use super::reader::EntryReader;

/// Fixed entry header, decoded from the first [`layout::HEADER_LEN`] bytes of
/// a frame. Lives for one iteration of the decode loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Total length of the entry, header included.
    pub entry_len: u16,
    /// On-wire header size or version indicator. Parsed for display only;
    /// payload offsets always use [`layout::HEADER_LEN`].
    pub header_size: u16,
    pub pid: i32,
    pub tid: i32,
    pub sec: u32,
    pub nsec: u32,
}

/// Decode the 4-byte entry prefix into `(entry_len, header_size)`.
pub fn parse_prefix(data: &[u8]) -> Result<(u16, u16), EntryError> {
    let reader = EntryReader::new(data);
    let entry_len = reader.read_u16_le(layout::ENTRY_LEN_RANGE)?;
    let header_size = reader.read_u16_le(layout::HEADER_SIZE_RANGE)?;
    Ok((entry_len, header_size))
}

/// Decode a full fixed header.
pub fn parse_header(data: &[u8]) -> Result<EntryHeader, EntryError> {
    let reader = EntryReader::new(data);
    reader.require_len(layout::HEADER_LEN)?;

    let entry_len = reader.read_u16_le(layout::ENTRY_LEN_RANGE)?;
    let header_size = reader.read_u16_le(layout::HEADER_SIZE_RANGE)?;
    let pid = reader.read_i32_le(layout::PID_RANGE)?;
    let tid = reader.read_i32_le(layout::TID_RANGE)?;
    let sec = reader.read_u32_le(layout::SEC_RANGE)?;
    let nsec = reader.read_u32_le(layout::NSEC_RANGE)?;

    Ok(EntryHeader {
        entry_len,
        header_size,
        pid,
        tid,
        sec,
        nsec,
    })
}

/// Decoded payload fields for one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadParts {
    pub level: Priority,
    pub tag: Option<String>,
    pub message: String,
    /// Set when the tag had no NUL terminator and [`layout::FALLBACK_TAG`]
    /// was substituted; the caller decides how loudly to report it.
    pub tag_unterminated: bool,
}

/// Split a payload into priority, tag and message.
///
/// An empty payload is a header-only entry: unknown level, no tag, empty
/// message. Otherwise byte 0 is the priority code, the tag runs from byte 1
/// to the first NUL, and the message is everything after that with all
/// trailing NULs stripped. When the tag terminator is missing the tag becomes
/// [`layout::FALLBACK_TAG`] and the message restarts at byte 1, so the
/// unterminated tag bytes end up in the message rather than being dropped.
pub fn parse_payload(payload: &[u8]) -> Result<PayloadParts, EntryError> {
    if payload.is_empty() {
        return Ok(PayloadParts {
            level: Priority::Unknown,
            tag: None,
            message: String::new(),
            tag_unterminated: false,
        });
    }

    let reader = EntryReader::new(payload);
    let prio = reader.read_u8(layout::PRIO_OFFSET)?;
    let level = Priority::from_code(prio);

    let (tag, message_start, tag_unterminated) = match payload[layout::TAG_START..]
        .iter()
        .position(|&byte| byte == 0)
    {
        Some(found) => {
            let terminator = layout::TAG_START + found;
            let tag = String::from_utf8_lossy(&payload[layout::TAG_START..terminator]).into_owned();
            (Some(tag), terminator + 1, false)
        }
        None => (
            Some(layout::FALLBACK_TAG.to_string()),
            layout::TAG_START,
            true,
        ),
    };

    let message_bytes = &payload[message_start..];
    let message_end = message_bytes
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |last| last + 1);
    let message = String::from_utf8_lossy(&message_bytes[..message_end]).into_owned();

    Ok(PayloadParts {
        level,
        tag,
        message,
        tag_unterminated,
    })
}
