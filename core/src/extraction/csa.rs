//! Structured vendor sub-format parser
//!
//! Recognizes the CSA-style binary header occasionally embedded in private
//! payloads: a signature (newer layout only), an entry count, and a run of
//! self-describing (name, type-tag, values) triples with 4-byte alignment
//! padding between items. Recognition failure is a typed non-match; the
//! parser never mutates caller state and never panics on malformed input.

use thiserror::Error;
use xxhash_rust::xxh3::Xxh3;

/// Magic signature of the newer header layout
const CSA2_MAGIC: &[u8; 4] = b"SV10";

/// Declared entry counts above this are treated as garbage, not headers
const MAX_DECLARED_ENTRIES: u32 = 10_000;

/// Hard caps applied while walking a recognized header
const MAX_PARSED_ENTRIES: u32 = 2_048;
const MAX_ITEMS_PER_ENTRY: u32 = 512;

/// Per-entry fixed header: 64-byte name, vm, 4-byte VR, syngo dt,
/// item count, one unused word
const ENTRY_HEADER_LEN: usize = 84;

/// The payload does not match the structured-header layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("payload does not match the structured header layout")]
pub struct CsaNotRecognized;

/// Header layout variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum CsaFormat {
    /// Legacy layout: entry count first, no signature
    Csa1,
    /// Signed layout: `SV10` magic, count at offset 8, entries at 16
    Csa2,
}

/// One decoded header entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CsaEntry {
    pub name: String,
    /// Type tag as declared in the entry header
    pub vr: String,
    pub vm: u32,
    pub values: Vec<String>,
}

/// Decoded summary of a structured header
///
/// The fingerprint is computed over the canonicalized entry content with
/// alignment padding stripped, so two structurally identical headers that
/// differ only in padding bytes hash identically. It is a consistency
/// indicator for comparing instances of one series, not an identity or
/// security artifact.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CsaHeaderSummary {
    pub format: CsaFormat,
    /// Entry count declared in the header (may exceed parsed entries
    /// when the payload is truncated)
    pub declared_count: u32,
    pub entries: Vec<CsaEntry>,
    /// xxh3-64 over the canonical (name, type-tag, values) sequence
    pub fingerprint: u64,
}

impl CsaHeaderSummary {
    /// Whether the payload carried the explicit layout signature
    pub fn signature_valid(&self) -> bool {
        matches!(self.format, CsaFormat::Csa2)
    }
}

/// Attempts to parse a private payload as a structured header
pub fn parse(raw: &[u8]) -> Result<CsaHeaderSummary, CsaNotRecognized> {
    if raw.is_empty() {
        return Err(CsaNotRecognized);
    }

    let (format, declared_count, mut offset) = if raw.starts_with(CSA2_MAGIC) {
        let count = read_u32(raw, 8).ok_or(CsaNotRecognized)?;
        (CsaFormat::Csa2, count, 16)
    } else {
        // Legacy layout: the count sits at offset 0, entries at 8. Some
        // writers shift the count by one word; retry there before
        // rejecting.
        let mut count = read_u32(raw, 0);
        if !plausible_count(count) {
            count = read_u32(raw, 4);
        }
        (CsaFormat::Csa1, count.ok_or(CsaNotRecognized)?, 8)
    };

    if declared_count == 0 || declared_count > MAX_DECLARED_ENTRIES {
        return Err(CsaNotRecognized);
    }

    let mut entries = Vec::new();
    for _ in 0..declared_count.min(MAX_PARSED_ENTRIES) {
        if offset + ENTRY_HEADER_LEN > raw.len() {
            break;
        }
        let name = read_padded_string(raw, offset, 64);
        offset += 64;
        let vm = read_u32(raw, offset).unwrap_or(0);
        offset += 4;
        let vr = read_padded_string(raw, offset, 4);
        offset += 4;
        // syngo data type, unused here
        offset += 4;
        let nitems = match read_u32(raw, offset) {
            Some(n) => n,
            None => break,
        };
        offset += 4;
        // trailing unused word
        offset += 4;

        let mut values = Vec::new();
        for _ in 0..nitems.min(MAX_ITEMS_PER_ENTRY) {
            if offset + 8 > raw.len() {
                break;
            }
            let item_len = match read_u32(raw, offset) {
                Some(n) => n as usize,
                None => break,
            };
            offset += 4;
            // item delimiter word, unused
            offset += 4;
            if offset + item_len > raw.len() {
                break;
            }
            if item_len > 0 {
                let decoded = trim_at_nul(&raw[offset..offset + item_len]);
                if !decoded.is_empty() {
                    values.push(decoded);
                }
            }
            offset += item_len;
            offset = align_4(offset);
        }

        if !name.is_empty() {
            entries.push(CsaEntry {
                name,
                vr,
                vm,
                values,
            });
        }
    }

    if entries.is_empty() {
        return Err(CsaNotRecognized);
    }

    let fingerprint = fingerprint_entries(&entries);
    Ok(CsaHeaderSummary {
        format,
        declared_count,
        entries,
        fingerprint,
    })
}

/// Canonical content hash over (name, type-tag, values) triples
///
/// Field and entry separators are control bytes that cannot occur in the
/// decoded strings, so the concatenation is unambiguous.
fn fingerprint_entries(entries: &[CsaEntry]) -> u64 {
    let mut hasher = Xxh3::new();
    for entry in entries {
        hasher.update(entry.name.as_bytes());
        hasher.update(&[0x1F]);
        hasher.update(entry.vr.as_bytes());
        for value in &entry.values {
            hasher.update(&[0x1F]);
            hasher.update(value.as_bytes());
        }
        hasher.update(&[0x1E]);
    }
    hasher.digest()
}

fn plausible_count(count: Option<u32>) -> bool {
    matches!(count, Some(n) if n > 0 && n <= MAX_DECLARED_ENTRIES)
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes = data.get(offset..end)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads a fixed-width NUL-padded string field
fn read_padded_string(data: &[u8], offset: usize, width: usize) -> String {
    match data.get(offset..offset + width) {
        Some(bytes) => trim_at_nul(bytes),
        None => String::new(),
    }
}

/// Decodes bytes up to the first NUL, trimming surrounding whitespace
fn trim_at_nul(bytes: &[u8]) -> String {
    let head = match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    };
    String::from_utf8_lossy(head).trim().to_string()
}

fn align_4(offset: usize) -> usize {
    (offset + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a CSA2 payload with the given entries, filling alignment
    /// padding with `pad` bytes.
    fn build_csa2(entries: &[(&str, &str, &[&str])], pad: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(CSA2_MAGIC);
        buf.extend_from_slice(&[4, 3, 2, 1]);
        buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        buf.extend_from_slice(&77u32.to_le_bytes());

        for (name, vr, values) in entries {
            let mut name_field = [0u8; 64];
            name_field[..name.len()].copy_from_slice(name.as_bytes());
            buf.extend_from_slice(&name_field);
            buf.extend_from_slice(&1u32.to_le_bytes()); // vm
            let mut vr_field = [0u8; 4];
            vr_field[..vr.len().min(4)].copy_from_slice(&vr.as_bytes()[..vr.len().min(4)]);
            buf.extend_from_slice(&vr_field);
            buf.extend_from_slice(&0u32.to_le_bytes()); // syngo dt
            buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
            buf.extend_from_slice(&0u32.to_le_bytes()); // unused

            for value in *values {
                buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
                buf.extend_from_slice(&0u32.to_le_bytes()); // delimiter
                buf.extend_from_slice(value.as_bytes());
                while buf.len() % 4 != 0 {
                    buf.push(pad);
                }
            }
        }
        buf
    }

    #[test]
    fn test_parse_csa2() {
        let raw = build_csa2(
            &[
                ("RadionuclideTotalDose", "DS", &["349000000"]),
                ("SliceThickness", "DS", &["3.0"]),
            ],
            0,
        );
        let summary = parse(&raw).unwrap();
        assert_eq!(summary.format, CsaFormat::Csa2);
        assert!(summary.signature_valid());
        assert_eq!(summary.declared_count, 2);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[0].name, "RadionuclideTotalDose");
        assert_eq!(summary.entries[0].values, vec!["349000000"]);
    }

    #[test]
    fn test_parse_csa1_layout() {
        // Legacy layout: count first, no signature
        let csa2 = build_csa2(&[("ImageOrientation", "DS", &["1.0"])], 0);
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&0u32.to_le_bytes());
        raw.extend_from_slice(&csa2[16..]);

        let summary = parse(&raw).unwrap();
        assert_eq!(summary.format, CsaFormat::Csa1);
        assert!(!summary.signature_valid());
        assert_eq!(summary.entries[0].name, "ImageOrientation");
    }

    #[test]
    fn test_fingerprint_ignores_padding_bytes() {
        let entries: &[(&str, &str, &[&str])] =
            &[("InjectionTime", "TM", &["113000.5", "extra"])];
        let zeros = parse(&build_csa2(entries, 0x00)).unwrap();
        let garbage = parse(&build_csa2(entries, 0xAA)).unwrap();
        assert_eq!(zeros.fingerprint, garbage.fingerprint);
        assert_eq!(zeros.entries, garbage.entries);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = parse(&build_csa2(&[("Dose", "DS", &["100"])], 0)).unwrap();
        let b = parse(&build_csa2(&[("Dose", "DS", &["200"])], 0)).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_rejects_text_payloads() {
        assert_eq!(parse(b"Institution: somewhere"), Err(CsaNotRecognized));
        assert_eq!(parse(b""), Err(CsaNotRecognized));
        assert_eq!(parse(&[0u8; 4]), Err(CsaNotRecognized));
    }

    #[test]
    fn test_rejects_implausible_counts() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&u32::MAX.to_le_bytes());
        raw.extend_from_slice(&u32::MAX.to_le_bytes());
        raw.extend_from_slice(&[0u8; 100]);
        assert_eq!(parse(&raw), Err(CsaNotRecognized));
    }

    #[test]
    fn test_truncated_payload_keeps_parsed_prefix() {
        let mut raw = build_csa2(&[("Entry1", "IS", &["1"]), ("Entry2", "IS", &["2"])], 0);
        // Declare more entries than the payload carries
        raw[8..12].copy_from_slice(&9u32.to_le_bytes());
        let summary = parse(&raw).unwrap();
        assert_eq!(summary.declared_count, 9);
        assert_eq!(summary.entries.len(), 2);
    }
}
