use std::fs::File;
use std::io::BufReader;

use pmsgcat_core::{FrameCursor, FrameError, HeaderStep};

fn encode_entry(pid: i32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&((20 + payload.len()) as u16).to_le_bytes());
    bytes.extend_from_slice(&20u16.to_le_bytes());
    bytes.extend_from_slice(&pid.to_le_bytes());
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn cursor_walks_entries_in_a_file() {
    let mut bytes = encode_entry(1, b"\x04tag\0one\0");
    bytes.extend_from_slice(&encode_entry(2, b"\x04tag\0two\0"));

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pmsg.bin");
    std::fs::write(&path, &bytes).expect("write fixture");

    let file = File::open(&path).expect("open fixture");
    let mut cursor = FrameCursor::new(BufReader::new(file));

    let mut pids = Vec::new();
    loop {
        match cursor.next_header().expect("framing") {
            HeaderStep::Entry { header, .. } => {
                let payload_len = usize::from(header.entry_len) - 20;
                cursor.read_payload(payload_len).expect("payload");
                pids.push(header.pid);
            }
            HeaderStep::Padding { .. } => continue,
            HeaderStep::Eof => break,
        }
    }

    assert_eq!(pids, vec![1, 2]);
    assert_eq!(cursor.offset(), bytes.len() as u64);
}

#[test]
fn cursor_rejects_truncated_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("truncated.bin");
    std::fs::write(&path, [0x1f, 0x00, 0x14]).expect("write fixture");

    let file = File::open(&path).expect("open fixture");
    let mut cursor = FrameCursor::new(BufReader::new(file));

    let err = cursor.next_header().unwrap_err();
    assert!(matches!(
        err,
        FrameError::TruncatedPrefix { offset: 0, got: 3 }
    ));
}

#[test]
fn cursor_reports_offsets_past_padding() {
    let mut bytes = vec![0u8; 4];
    bytes.extend_from_slice(&encode_entry(5, b"\x03t\0m\0"));

    let mut cursor = FrameCursor::new(std::io::Cursor::new(bytes));
    assert!(matches!(
        cursor.next_header().unwrap(),
        HeaderStep::Padding { offset: 0 }
    ));
    match cursor.next_header().unwrap() {
        HeaderStep::Entry { offset, header } => {
            assert_eq!(offset, 4);
            assert_eq!(header.pid, 5);
        }
        other => panic!("expected entry, got {other:?}"),
    }
}
