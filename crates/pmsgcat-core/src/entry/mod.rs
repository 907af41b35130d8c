//! Entry wire-format decoding.
//!
//! The format follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe little-endian byte access
//! - `parser`: domain-level decoding (no direct byte indexing outside ranges)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the source and decode layers handle
//! file access and record aggregation.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::EntryError;
pub use parser::{EntryHeader, PayloadParts, parse_header, parse_payload, parse_prefix};
