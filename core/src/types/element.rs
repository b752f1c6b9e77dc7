use dicom_core::{Tag, VR};

/// Group number of the pixel-data tag class.
///
/// Elements in this group carry bulk image data and are never routed
/// through the text decoding pipeline.
pub const PIXEL_DATA_GROUP: u16 = 0x7FE0;

/// A single decoded data element, as handed over by the container-format
/// layer.
///
/// The wire-level concerns (transfer syntax, VR resolution, sequence
/// delimiting) are already resolved by the time one of these exists.
/// Instances are immutable once produced; every derived structure in the
/// engine is layered beside them, never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedElement {
    /// Element tag (group, element)
    pub tag: Tag,

    /// Resolved value representation
    pub vr: VR,

    /// Raw value bytes. Empty for sequence elements.
    pub bytes: Vec<u8>,

    /// Nested sequence items, each item being its own element list.
    /// `None` for non-sequence elements.
    pub items: Option<Vec<Vec<DecodedElement>>>,
}

impl DecodedElement {
    /// Creates a primitive (non-sequence) element
    pub fn new(tag: Tag, vr: VR, bytes: Vec<u8>) -> Self {
        Self {
            tag,
            vr,
            bytes,
            items: None,
        }
    }

    /// Creates a sequence element from its items
    pub fn sequence(tag: Tag, items: Vec<Vec<DecodedElement>>) -> Self {
        Self {
            tag,
            vr: VR::SQ,
            bytes: Vec::new(),
            items: Some(items),
        }
    }

    /// Returns the tag group
    pub fn group(&self) -> u16 {
        self.tag.group()
    }

    /// Returns the tag element number
    pub fn element(&self) -> u16 {
        self.tag.element()
    }

    /// Whether this element belongs to the pixel-data tag class
    pub fn is_pixel_data_class(&self) -> bool {
        self.group() == PIXEL_DATA_GROUP
    }
}

/// Classification of a data element by tag group parity
///
/// Even groups carry standard-dictionary semantics; odd groups are
/// vendor-defined private blocks. The mapping is total: every element
/// classifies to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum TagClass {
    /// Even group: semantics fixed by the public dictionary
    Standard,
    /// Odd group: semantics defined by the private-block owner
    Private,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_constructor_sets_sq() {
        let elem = DecodedElement::sequence(Tag(0x0054, 0x0016), vec![vec![]]);
        assert_eq!(elem.vr, VR::SQ);
        assert!(elem.bytes.is_empty());
        assert_eq!(elem.items.as_ref().map(|i| i.len()), Some(1));
    }

    #[test]
    fn test_pixel_data_class() {
        let pixels = DecodedElement::new(Tag(0x7FE0, 0x0010), VR::OB, vec![0u8; 16]);
        assert!(pixels.is_pixel_data_class());

        let modality = DecodedElement::new(Tag(0x0008, 0x0060), VR::CS, b"PT".to_vec());
        assert!(!modality.is_pixel_data_class());
    }
}
