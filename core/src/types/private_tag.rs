use crate::extraction::csa::CsaHeaderSummary;
use std::fmt;

/// Outcome of decoding a private payload
///
/// Produced by the conservative decode chain: ascii, then structured,
/// then hex, then length. Exactly one variant is produced per payload
/// and the mapping is deterministic for a fixed byte sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum DecodeOutcome {
    /// Payload was printable text
    Ascii(String),
    /// Payload matched the vendor structured-header layout
    Structured(CsaHeaderSummary),
    /// Short opaque payload, rendered as hex
    Hex(String),
    /// Large opaque payload; only the byte length is kept
    Length(usize),
}

impl DecodeOutcome {
    /// Human-oriented rendering of the outcome
    ///
    /// Never exposes raw binary: opaque payloads surface as hex or as a
    /// byte count.
    pub fn display_value(&self) -> String {
        match self {
            DecodeOutcome::Ascii(text) => text.clone(),
            DecodeOutcome::Structured(summary) => {
                format!("structured header ({} entries)", summary.entries.len())
            }
            DecodeOutcome::Hex(hex) => hex.clone(),
            DecodeOutcome::Length(len) => format!("({} bytes)", len),
        }
    }

    /// Returns decoded text when the payload was ASCII
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Ascii(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the structured summary when one was recognized
    pub fn as_structured(&self) -> Option<&CsaHeaderSummary> {
        match self {
            DecodeOutcome::Structured(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Provenance category of a private tag
///
/// Assigned from the creator identity and manufacturer, mirroring the
/// block owners seen in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum PrivateTagCategory {
    /// Anonymization/processing pipeline markers (CTP, QIICR, highdicom)
    PipelineProvenance,
    /// Radiotherapy system provenance (Varian)
    RtProvenance,
    /// Vendor blocks with decodable semantics (Siemens CSA, Spectrum Dynamics)
    VendorSemantic,
    /// Recognized vendor blocks without decoded semantics
    VendorRaw,
    /// Unattributed opaque payloads
    UnknownBinary,
}

impl fmt::Display for PrivateTagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrivateTagCategory::PipelineProvenance => "pipeline_provenance",
            PrivateTagCategory::RtProvenance => "rt_provenance",
            PrivateTagCategory::VendorSemantic => "vendor_semantic",
            PrivateTagCategory::VendorRaw => "vendor_raw",
            PrivateTagCategory::UnknownBinary => "unknown_binary",
        };
        f.write_str(s)
    }
}

/// Decoded view of one private data element
///
/// Created once per private element per object and owned by the object
/// record; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PrivateTagRecord {
    /// Tag group (always odd)
    pub group: u16,

    /// Tag element number
    pub element: u16,

    /// Private creator string resolved from the block reservation,
    /// when present
    pub creator: Option<String>,

    /// Value representation as declared on the wire
    pub vr: String,

    /// Length of the raw payload in bytes
    pub byte_len: usize,

    /// Decode outcome for the payload
    pub outcome: DecodeOutcome,

    /// Provenance category
    pub category: PrivateTagCategory,
}

impl PrivateTagRecord {
    /// Display value derived from the decode outcome
    pub fn display_value(&self) -> String {
        self.outcome.display_value()
    }

    /// Creator string, or the block's conventional placeholder
    pub fn creator_or_unknown(&self) -> &str {
        self.creator.as_deref().unwrap_or("Unknown")
    }
}
