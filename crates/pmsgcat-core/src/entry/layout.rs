pub const ENTRY_LEN_RANGE: std::ops::Range<usize> = 0..2;
pub const HEADER_SIZE_RANGE: std::ops::Range<usize> = 2..4;
pub const PID_RANGE: std::ops::Range<usize> = 4..8;
pub const TID_RANGE: std::ops::Range<usize> = 8..12;
pub const SEC_RANGE: std::ops::Range<usize> = 12..16;
pub const NSEC_RANGE: std::ops::Range<usize> = 16..20;

/// Bytes of the prefix probe: `entry_len` + `header_size`.
pub const PREFIX_LEN: usize = 4;

/// Fixed size of the entry header. The on-wire `header_size` field is parsed
/// and surfaced, but payload offsets always assume this constant; variable
/// header sizes are out of scope for the assumed logger_entry structure.
pub const HEADER_LEN: usize = 20;

/// First payload byte is the priority code.
pub const PRIO_OFFSET: usize = 0;
/// The tag terminator scan starts after the priority byte.
pub const TAG_START: usize = 1;

/// Tag used when the payload carries no NUL terminator for the tag field.
pub const FALLBACK_TAG: &str = "ErrorTag";
