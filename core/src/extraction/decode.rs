//! Conservative private-payload decoding
//!
//! Precedence: ascii, then the structured sub-format, then hex for short
//! payloads, then length only. Every byte sequence lands in exactly one
//! outcome; malformed input falls through the chain instead of raising.

use crate::extraction::csa;
use crate::types::DecodeOutcome;
use std::fmt::Write;

/// Opaque payloads at or below this size render as hex; anything larger
/// is recorded by length only, so multi-kilobyte blobs never become
/// display text.
pub const HEX_DISPLAY_LIMIT: usize = 256;

/// Decodes a private payload of unknown structure
pub fn decode_private_payload(bytes: &[u8]) -> DecodeOutcome {
    if bytes.is_empty() {
        return DecodeOutcome::Length(0);
    }
    if let Some(text) = decode_ascii(bytes) {
        return DecodeOutcome::Ascii(text);
    }
    if let Ok(summary) = csa::parse(bytes) {
        return DecodeOutcome::Structured(summary);
    }
    if bytes.len() <= HEX_DISPLAY_LIMIT {
        return DecodeOutcome::Hex(to_hex(bytes));
    }
    DecodeOutcome::Length(bytes.len())
}

/// Attempts to decode the payload as printable text
///
/// Trailing NUL padding is tolerated; after stripping it, every byte
/// must be printable ASCII or HT/LF/CR whitespace. Requiring the whole
/// payload keeps structured binary (whose leading count bytes are often
/// printable) out of this branch.
fn decode_ascii(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().rposition(|&b| b != 0)? + 1;
    let head = &bytes[..end];
    if !head.iter().all(|&b| is_text_byte(b)) {
        return None;
    }
    let text = String::from_utf8_lossy(head).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn is_text_byte(b: u8) -> bool {
    matches!(b, 9 | 10 | 13) || (32..=126).contains(&b)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
