//! Tag classification and private-creator resolution
//!
//! Classification is a total, pure function of the tag group: odd groups
//! are private, even groups are standard. Creator identities are resolved
//! from the reservation elements at `(group, 0x0010..=0x00FF)` whose block
//! index matches the high byte of a data element's number.

use crate::types::{DecodedElement, DecodeOutcome, PrivateTagCategory, TagClass};
use dicom_core::Tag;
use std::collections::HashMap;

/// Classifies a tag as standard or private by group parity
pub fn classify(tag: Tag) -> TagClass {
    if tag.group() % 2 == 1 {
        TagClass::Private
    } else {
        TagClass::Standard
    }
}

/// Whether a tag is a private-creator reservation element
pub fn is_private_creator(tag: Tag) -> bool {
    classify(tag) == TagClass::Private && (0x0010..=0x00FF).contains(&tag.element())
}

/// Whether a tag is a private data element (owned by a reserved block)
pub fn is_private_data(tag: Tag) -> bool {
    classify(tag) == TagClass::Private && tag.element() >= 0x1000
}

/// Lookup table from (group, block) to the creator string that reserved
/// the block
///
/// Built once per object from the decoded element view, including
/// elements nested inside sequences.
#[derive(Debug, Clone, Default)]
pub struct PrivateCreatorMap {
    creators: HashMap<(u16, u8), String>,
}

impl PrivateCreatorMap {
    /// Collects creator reservations from an element list
    pub fn from_elements(elements: &[DecodedElement]) -> Self {
        let mut map = Self::default();
        map.collect(elements);
        map
    }

    fn collect(&mut self, elements: &[DecodedElement]) {
        for elem in elements {
            if is_private_creator(elem.tag) {
                let creator = decode_creator(&elem.bytes);
                if !creator.is_empty() {
                    let block = (elem.element() & 0x00FF) as u8;
                    self.creators.insert((elem.group(), block), creator);
                }
            }
            if let Some(items) = &elem.items {
                for item in items {
                    self.collect(item);
                }
            }
        }
    }

    /// Resolves the creator for a private data element
    ///
    /// The owning block is the high byte of the element number.
    pub fn resolve(&self, tag: Tag) -> Option<&str> {
        let block = (tag.element() >> 8) as u8;
        self.creators
            .get(&(tag.group(), block))
            .map(String::as_str)
    }

    /// Number of reserved blocks seen
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

/// Decodes a creator reservation value (short text, NUL/space padded)
fn decode_creator(bytes: &[u8]) -> String {
    let head = match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    };
    String::from_utf8_lossy(head).trim().to_string()
}

/// Assigns a provenance category from creator, manufacturer and decode
/// outcome
pub fn classify_category(
    creator: Option<&str>,
    manufacturer: Option<&str>,
    outcome: &DecodeOutcome,
) -> PrivateTagCategory {
    let creator_upper = creator.unwrap_or("").to_uppercase();
    let manufacturer_upper = manufacturer.unwrap_or("").to_uppercase();

    if creator_upper.contains("CTP")
        || creator_upper.contains("QIICR")
        || creator_upper.contains("HIGHDICOM")
    {
        return PrivateTagCategory::PipelineProvenance;
    }
    if creator_upper.contains("VARIAN") {
        return PrivateTagCategory::RtProvenance;
    }
    if creator_upper.contains("SIEMENS") || manufacturer_upper.contains("SIEMENS") {
        if creator_upper.contains("CSA") {
            return PrivateTagCategory::VendorSemantic;
        }
        return PrivateTagCategory::VendorRaw;
    }
    if matches!(
        creator_upper.as_str(),
        "SD" | "SPECTRUM DYNAMICS" | "SPECTRUM-DYNAMICS"
    ) || manufacturer_upper.contains("SPECTRUM")
    {
        return PrivateTagCategory::VendorSemantic;
    }
    if creator_upper.contains("GE")
        || creator_upper.contains("GEMS")
        || manufacturer_upper.contains("GE ")
        || creator_upper.contains("PHILIPS")
        || manufacturer_upper.contains("PHILIPS")
        || creator_upper.contains("TOSHIBA")
        || manufacturer_upper.contains("CANON")
    {
        return PrivateTagCategory::VendorRaw;
    }
    match outcome {
        DecodeOutcome::Structured(_) => PrivateTagCategory::VendorSemantic,
        DecodeOutcome::Ascii(_) => PrivateTagCategory::VendorRaw,
        _ => PrivateTagCategory::UnknownBinary,
    }
}
