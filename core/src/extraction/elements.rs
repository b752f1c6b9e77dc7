//! Adapter from the container-format layer to the engine's element view
//!
//! Everything downstream of this module operates on [`DecodedElement`]
//! values; the DICOM object itself is only touched here and by the typed
//! standard-tag accessors.

use crate::types::{DecodedElement, PIXEL_DATA_GROUP};
use dicom_object::InMemDicomObject;
use log::warn;

/// Sequences nested deeper than this are dropped rather than walked;
/// no clinical object comes close, so deeper nesting means a corrupt
/// or adversarial structure
const MAX_SEQUENCE_DEPTH: usize = 16;

/// Produces the decoded element view of an in-memory DICOM object
///
/// Nested sequences are converted recursively. Pixel-data-class elements
/// are omitted: bulk image data never enters the metadata pipeline.
pub fn decode_elements(dcm: &InMemDicomObject) -> Vec<DecodedElement> {
    decode_at_depth(dcm, 0)
}

fn decode_at_depth(dcm: &InMemDicomObject, depth: usize) -> Vec<DecodedElement> {
    let mut out = Vec::new();
    for elem in dcm {
        let tag = elem.tag();
        if tag.group() == PIXEL_DATA_GROUP {
            continue;
        }
        if let Some(items) = elem.items() {
            if depth >= MAX_SEQUENCE_DEPTH {
                warn!("sequence at {} exceeds depth limit; contents dropped", tag);
                out.push(DecodedElement::sequence(tag, Vec::new()));
                continue;
            }
            let nested = items
                .iter()
                .map(|item| decode_at_depth(item, depth + 1))
                .collect();
            out.push(DecodedElement::sequence(tag, nested));
        } else {
            let bytes: Vec<u8> = match elem.value().primitive() {
                Some(primitive) => primitive.to_bytes().into(),
                None => Vec::new(),
            };
            out.push(DecodedElement::new(tag, elem.vr(), bytes));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::DataSetSequence;
    use dicom_core::{DataElement, PrimitiveValue, Tag, VR};

    #[test]
    fn test_decodes_primitive_and_private_elements() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            Tag(0x0008, 0x0060),
            VR::CS,
            PrimitiveValue::from("PT"),
        ));
        dcm.put(DataElement::new(
            Tag(0x0029, 0x0010),
            VR::LO,
            PrimitiveValue::from("SIEMENS CSA HEADER"),
        ));
        dcm.put(DataElement::new(
            Tag(0x0029, 0x1010),
            VR::OB,
            PrimitiveValue::U8(vec![1u8, 2, 3, 4].into()),
        ));

        let elements = decode_elements(&dcm);
        assert_eq!(elements.len(), 3);

        let private = elements
            .iter()
            .find(|e| e.tag == Tag(0x0029, 0x1010))
            .unwrap();
        assert_eq!(private.vr, VR::OB);
        assert_eq!(private.bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_decodes_nested_sequences() {
        let mut item = InMemDicomObject::new_empty();
        item.put(DataElement::new(
            Tag(0x0018, 0x0031),
            VR::LO,
            PrimitiveValue::from("FDG"),
        ));

        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            Tag(0x0054, 0x0016),
            VR::SQ,
            DataSetSequence::from(vec![item]),
        ));

        let elements = decode_elements(&dcm);
        assert_eq!(elements.len(), 1);
        let items = elements[0].items.as_ref().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0][0].tag, Tag(0x0018, 0x0031));
    }

    #[test]
    fn test_pixel_data_is_excluded() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            Tag(0x7FE0, 0x0010),
            VR::OB,
            PrimitiveValue::U8(vec![0u8; 64].into()),
        ));
        assert!(decode_elements(&dcm).is_empty());
    }
}
