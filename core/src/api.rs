use crate::error::Result;
use crate::extraction::csa::CsaHeaderSummary;
use crate::extraction::tags::{
    get_float_value, get_int_value, get_string_value, ACQUISITION_DATE, ACQUISITION_TIME,
    CONTENT_DATE, CONTENT_TIME, DECAY_CORRECTION, IMAGES_IN_ACQUISITION, INSTITUTION_NAME,
    MANUFACTURER, MANUFACTURER_MODEL_NAME, MODALITY, NUMBER_OF_FRAMES, PATIENT_ID, PATIENT_WEIGHT,
    PROTOCOL_NAME, RADIONUCLIDE_HALF_LIFE, RADIONUCLIDE_TOTAL_DOSE, RADIOPHARMACEUTICAL,
    RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, RADIOPHARMACEUTICAL_START_DATETIME,
    RADIOPHARMACEUTICAL_START_TIME, SERIES_DATE, SERIES_DESCRIPTION, SERIES_INSTANCE_UID,
    SERIES_NUMBER, SERIES_TIME, SOP_INSTANCE_UID, STATION_NAME, STUDY_DATE, STUDY_DESCRIPTION,
    STUDY_INSTANCE_UID, STUDY_TIME,
};
use crate::extraction::{
    classify_category, decode_elements, decode_private_payload, is_private_data, PrivateCreatorMap,
};
use crate::temporal::{RolloverPolicy, TemporalRecord};
use crate::types::{FieldProvenance, NormalizedFields, PrivateTagRecord};
use crate::vendor::{backfill, ExtractorChain};
use dicom_object::InMemDicomObject;
use log::warn;
use std::path::PathBuf;

/// Canonical per-object record
///
/// Carries the standard-tag fields, the merged canonical fields with
/// their backfill provenance, the decoded private tags, structured
/// header summaries, and the reconciled timeline. All of it is an
/// additive annotation beside the source object; nothing here feeds
/// back into the decoded elements.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ObjectRecord {
    // Identification
    pub sop_instance_uid: Option<String>,
    pub study_instance_uid: Option<String>,
    pub series_instance_uid: Option<String>,

    // Study/series context
    pub study_description: Option<String>,
    pub series_description: Option<String>,
    pub series_number: Option<i32>,
    pub modality: Option<String>,
    pub protocol_name: Option<String>,
    pub instance_count: Option<i32>,

    // Equipment
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub station_name: Option<String>,
    pub institution_name: Option<String>,

    // Patient
    pub patient_id: Option<String>,
    pub decay_correction: Option<String>,

    /// Canonical fields after standard extraction and vendor backfill
    pub fields: NormalizedFields,
    /// One entry per canonical field filled from a vendor candidate
    pub provenance: Vec<FieldProvenance>,
    /// Name reported by the extractor that produced the candidates
    pub vendor: String,
    /// Advisory confidence of that extractor's result
    pub vendor_confidence: f32,

    /// Decoded private tags, in element order
    pub private_tags: Vec<PrivateTagRecord>,
    /// Structured image-header summary, when present
    pub csa_image: Option<CsaHeaderSummary>,
    /// Structured series-header summary, when present
    pub csa_series: Option<CsaHeaderSummary>,

    /// Reconciled timeline
    pub temporal: TemporalRecord,

    /// Set when part of the extraction had to be abandoned; the fields
    /// that succeeded are still populated
    pub failure: Option<String>,

    /// Source file, when the record came from a batch run
    pub source_path: Option<PathBuf>,
}

impl ObjectRecord {
    /// Key under which this record deduplicates in the store
    ///
    /// Series identifier, with the SOP instance identifier as a
    /// fallback for objects missing one.
    pub fn dedup_key(&self) -> Option<&str> {
        self.series_instance_uid
            .as_deref()
            .or(self.sop_instance_uid.as_deref())
    }
}

struct PrivateStage {
    private_tags: Vec<PrivateTagRecord>,
    csa_image: Option<CsaHeaderSummary>,
    csa_series: Option<CsaHeaderSummary>,
}

/// Main extractor for normalized object metadata
///
/// # Example
///
/// ```
/// use radnorm_core::{ExtractorChain, MetadataExtractor, RolloverPolicy};
/// use dicom_object::InMemDicomObject;
/// use dicom_core::{DataElement, PrimitiveValue, VR, Tag};
///
/// let mut dcm = InMemDicomObject::new_empty();
/// dcm.put(DataElement::new(
///     Tag(0x0008, 0x0060), // Modality
///     VR::CS,
///     PrimitiveValue::from("PT"),
/// ));
/// dcm.put(DataElement::new(
///     Tag(0x0008, 0x0070), // Manufacturer
///     VR::LO,
///     PrimitiveValue::from("SIEMENS"),
/// ));
///
/// let chain = ExtractorChain::standard();
/// let record = MetadataExtractor::extract(&dcm, &chain, &RolloverPolicy::default()).unwrap();
///
/// assert_eq!(record.modality.as_deref(), Some("PT"));
/// assert_eq!(record.vendor, "Siemens");
/// ```
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extracts the canonical record from a decoded DICOM object
    ///
    /// Standard-tag values are extracted first and are authoritative;
    /// the vendor stage may only backfill canonical fields the standard
    /// tags left empty. A failure inside the private stage is contained:
    /// the record keeps whatever succeeded and carries a failure marker.
    pub fn extract(
        dcm: &InMemDicomObject,
        chain: &ExtractorChain,
        rollover: &RolloverPolicy,
    ) -> Result<ObjectRecord> {
        let mut record = Self::standard_stage(dcm, rollover);

        match Self::private_stage(dcm, record.manufacturer.as_deref()) {
            Ok(stage) => {
                record.private_tags = stage.private_tags;
                record.csa_image = stage.csa_image;
                record.csa_series = stage.csa_series;
            }
            Err(e) => {
                warn!(
                    "private tag stage failed for object {}: {}",
                    record.sop_instance_uid.as_deref().unwrap_or("<no uid>"),
                    e
                );
                record.failure = Some(e.to_string());
            }
        }

        let manufacturer = record.manufacturer.clone().unwrap_or_default();
        let vendor = chain.run(&manufacturer, &record.private_tags);
        record.vendor = vendor.vendor_name.clone();
        record.vendor_confidence = vendor.confidence;
        record.provenance = backfill(&mut record.fields, std::slice::from_ref(&vendor));

        Ok(record)
    }

    /// Standard-tag extraction and temporal reconciliation
    fn standard_stage(dcm: &InMemDicomObject, rollover: &RolloverPolicy) -> ObjectRecord {
        // Nuclear medicine fields live in a sequence item, with flat-tag
        // fallbacks seen on older writers
        let nm_item = dcm
            .element(RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE)
            .ok()
            .and_then(|e| e.items())
            .and_then(|items| items.first());

        let radiopharmaceutical = nm_item
            .and_then(|item| get_string_value(item, RADIOPHARMACEUTICAL))
            .or_else(|| get_string_value(dcm, RADIOPHARMACEUTICAL));
        let injected_activity_bq = nm_item
            .and_then(|item| get_float_value(item, RADIONUCLIDE_TOTAL_DOSE))
            .or_else(|| get_float_value(dcm, RADIONUCLIDE_TOTAL_DOSE));
        let half_life_seconds = nm_item
            .and_then(|item| get_float_value(item, RADIONUCLIDE_HALF_LIFE))
            .or_else(|| get_float_value(dcm, RADIONUCLIDE_HALF_LIFE));
        let start_datetime = nm_item
            .and_then(|item| get_string_value(item, RADIOPHARMACEUTICAL_START_DATETIME))
            .or_else(|| get_string_value(dcm, RADIOPHARMACEUTICAL_START_DATETIME));
        let injection_time = nm_item
            .and_then(|item| get_string_value(item, RADIOPHARMACEUTICAL_START_TIME))
            .or_else(|| get_string_value(dcm, RADIOPHARMACEUTICAL_START_TIME))
            .or_else(|| datetime_part(start_datetime.as_deref(), 8, 14));
        let injection_date = datetime_part(start_datetime.as_deref(), 0, 8);

        let temporal = TemporalRecord {
            study_date: get_string_value(dcm, STUDY_DATE),
            study_time: get_string_value(dcm, STUDY_TIME),
            series_date: get_string_value(dcm, SERIES_DATE),
            series_time: get_string_value(dcm, SERIES_TIME),
            acquisition_date: get_string_value(dcm, ACQUISITION_DATE),
            acquisition_time: get_string_value(dcm, ACQUISITION_TIME),
            content_date: get_string_value(dcm, CONTENT_DATE),
            content_time: get_string_value(dcm, CONTENT_TIME),
            injection_date: injection_date.clone(),
            injection_time: injection_time.clone(),
            rollover_suspected: false,
        }
        .reconciled(rollover);

        let fields = NormalizedFields {
            radiopharmaceutical,
            injected_activity_bq,
            injection_date,
            injection_time,
            patient_weight_kg: get_float_value(dcm, PATIENT_WEIGHT),
            half_life_seconds,
            injection_delay_minutes: temporal.injection_delay_minutes(),
        };

        ObjectRecord {
            sop_instance_uid: get_string_value(dcm, SOP_INSTANCE_UID),
            study_instance_uid: get_string_value(dcm, STUDY_INSTANCE_UID),
            series_instance_uid: get_string_value(dcm, SERIES_INSTANCE_UID),
            study_description: get_string_value(dcm, STUDY_DESCRIPTION),
            series_description: get_string_value(dcm, SERIES_DESCRIPTION),
            series_number: get_int_value(dcm, SERIES_NUMBER),
            modality: get_string_value(dcm, MODALITY),
            protocol_name: get_string_value(dcm, PROTOCOL_NAME),
            instance_count: get_int_value(dcm, IMAGES_IN_ACQUISITION)
                .or_else(|| get_int_value(dcm, NUMBER_OF_FRAMES)),
            manufacturer: get_string_value(dcm, MANUFACTURER),
            model: get_string_value(dcm, MANUFACTURER_MODEL_NAME),
            station_name: get_string_value(dcm, STATION_NAME),
            institution_name: get_string_value(dcm, INSTITUTION_NAME),
            patient_id: get_string_value(dcm, PATIENT_ID),
            decay_correction: get_string_value(dcm, DECAY_CORRECTION),
            fields,
            temporal,
            ..Default::default()
        }
    }

    /// Decodes private tags and attaches structured header summaries
    fn private_stage(dcm: &InMemDicomObject, manufacturer: Option<&str>) -> Result<PrivateStage> {
        let elements = decode_elements(dcm);
        let creators = PrivateCreatorMap::from_elements(&elements);

        let mut private_tags = Vec::new();
        for elem in &elements {
            if !is_private_data(elem.tag) || elem.items.is_some() {
                continue;
            }
            let creator = creators.resolve(elem.tag).map(str::to_string);
            let outcome = decode_private_payload(&elem.bytes);
            let category = classify_category(creator.as_deref(), manufacturer, &outcome);
            private_tags.push(PrivateTagRecord {
                group: elem.group(),
                element: elem.element(),
                creator,
                vr: format!("{:?}", elem.vr),
                byte_len: elem.bytes.len(),
                outcome,
                category,
            });
        }

        // Siemens attaches the structured image header in block element
        // 0x10 and the series header in 0x20 of group 0x0029
        let csa_image = find_structured(&private_tags, 0x10);
        let csa_series = find_structured(&private_tags, 0x20);

        Ok(PrivateStage {
            private_tags,
            csa_image,
            csa_series,
        })
    }
}

fn find_structured(tags: &[PrivateTagRecord], block_element: u16) -> Option<CsaHeaderSummary> {
    tags.iter()
        .filter(|t| t.group == 0x0029 && t.element & 0x00FF == block_element)
        .find_map(|t| t.outcome.as_structured().cloned())
}

fn datetime_part(datetime: Option<&str>, start: usize, end: usize) -> Option<String> {
    let text = datetime?.trim();
    text.get(start..end).map(str::to_string)
}
