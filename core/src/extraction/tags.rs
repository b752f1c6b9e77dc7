use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Identification Tags
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);

// Study/Series Tags
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);

// Acquisition/Content Timing Tags
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);

// Device/Manufacturer Tags
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const STATION_NAME: Tag = Tag(0x0008, 0x1010);
pub const SOFTWARE_VERSIONS: Tag = Tag(0x0018, 0x1020);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);

// Patient Tags
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_WEIGHT: Tag = Tag(0x0010, 0x1030);

// Nuclear Medicine Tags
pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
pub const RADIOPHARMACEUTICAL: Tag = Tag(0x0018, 0x0031);
pub const RADIOPHARMACEUTICAL_START_TIME: Tag = Tag(0x0018, 0x1072);
pub const RADIOPHARMACEUTICAL_START_DATETIME: Tag = Tag(0x0018, 0x1078);
pub const RADIONUCLIDE_TOTAL_DOSE: Tag = Tag(0x0018, 0x1074);
pub const RADIONUCLIDE_HALF_LIFE: Tag = Tag(0x0018, 0x1075);
pub const DECAY_CORRECTION: Tag = Tag(0x0054, 0x1102);

// Instance Counting Tags
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const IMAGES_IN_ACQUISITION: Tag = Tag(0x0020, 0x1002);

// Bulk Data Tags
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present, cannot be converted to
/// string, or trims to empty
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get float value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to f64
pub fn get_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}

/// Helper to get multi-string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to Vec<String>
pub fn get_multi_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<String>> {
    dcm.element(tag).ok().and_then(|elem| {
        // Try to get as multi-string
        if let Ok(strs) = elem.to_multi_str() {
            Some(strs.iter().map(|s| s.to_string()).collect())
        } else {
            // Fallback: try to get as single string and split by backslash
            elem.to_str()
                .ok()
                .map(|s| s.split('\\').map(|part| part.trim().to_string()).collect())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values() {
        // Just ensure tags are correctly defined
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
        assert_eq!(ACQUISITION_DATE, Tag(0x0008, 0x0022));
        assert_eq!(RADIONUCLIDE_TOTAL_DOSE, Tag(0x0018, 0x1074));
        assert_eq!(SERIES_INSTANCE_UID, Tag(0x0020, 0x000E));
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
    }

    #[test]
    fn test_get_string_value_trims_to_none() {
        use dicom_core::{DataElement, PrimitiveValue, VR};

        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(MODALITY, VR::CS, PrimitiveValue::from("  ")));
        assert_eq!(get_string_value(&dcm, MODALITY), None);

        dcm.put(DataElement::new(MODALITY, VR::CS, PrimitiveValue::from("PT ")));
        assert_eq!(get_string_value(&dcm, MODALITY), Some("PT".to_string()));
    }
}
