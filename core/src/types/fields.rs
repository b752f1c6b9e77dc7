use std::fmt;

/// Canonical field names produced by vendor normalization
///
/// The set is closed: extractors can only emit fields named here, which
/// keeps the merge step and its non-overwrite guarantee checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum CanonicalField {
    Radiopharmaceutical,
    InjectedActivityBq,
    InjectionDate,
    InjectionTime,
    PatientWeightKg,
    HalfLifeSeconds,
    InjectionDelayMinutes,
}

impl CanonicalField {
    /// All canonical fields, in merge order
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Radiopharmaceutical,
        CanonicalField::InjectedActivityBq,
        CanonicalField::InjectionDate,
        CanonicalField::InjectionTime,
        CanonicalField::PatientWeightKg,
        CanonicalField::HalfLifeSeconds,
        CanonicalField::InjectionDelayMinutes,
    ];

    /// Returns the snake_case name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Radiopharmaceutical => "radiopharmaceutical",
            CanonicalField::InjectedActivityBq => "injected_activity_bq",
            CanonicalField::InjectionDate => "injection_date",
            CanonicalField::InjectionTime => "injection_time",
            CanonicalField::PatientWeightKg => "patient_weight_kg",
            CanonicalField::HalfLifeSeconds => "half_life_seconds",
            CanonicalField::InjectionDelayMinutes => "injection_delay_minutes",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate value for a canonical field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum CanonicalValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Text(s) => f.write_str(s),
            CanonicalValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Canonical per-object fields after standard extraction and merge
///
/// Values sourced from standard tags land here first; vendor candidates
/// may only backfill slots that are still empty.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NormalizedFields {
    pub radiopharmaceutical: Option<String>,
    pub injected_activity_bq: Option<f64>,
    pub injection_date: Option<String>,
    pub injection_time: Option<String>,
    pub patient_weight_kg: Option<f64>,
    pub half_life_seconds: Option<f64>,
    pub injection_delay_minutes: Option<f64>,
}

impl NormalizedFields {
    /// Whether a canonical field currently holds a value
    pub fn is_present(&self, field: CanonicalField) -> bool {
        match field {
            CanonicalField::Radiopharmaceutical => self.radiopharmaceutical.is_some(),
            CanonicalField::InjectedActivityBq => self.injected_activity_bq.is_some(),
            CanonicalField::InjectionDate => self.injection_date.is_some(),
            CanonicalField::InjectionTime => self.injection_time.is_some(),
            CanonicalField::PatientWeightKg => self.patient_weight_kg.is_some(),
            CanonicalField::HalfLifeSeconds => self.half_life_seconds.is_some(),
            CanonicalField::InjectionDelayMinutes => self.injection_delay_minutes.is_some(),
        }
    }

    /// Returns the current value of a canonical field
    pub fn get(&self, field: CanonicalField) -> Option<CanonicalValue> {
        match field {
            CanonicalField::Radiopharmaceutical => self
                .radiopharmaceutical
                .clone()
                .map(CanonicalValue::Text),
            CanonicalField::InjectedActivityBq => {
                self.injected_activity_bq.map(CanonicalValue::Number)
            }
            CanonicalField::InjectionDate => self.injection_date.clone().map(CanonicalValue::Text),
            CanonicalField::InjectionTime => self.injection_time.clone().map(CanonicalValue::Text),
            CanonicalField::PatientWeightKg => self.patient_weight_kg.map(CanonicalValue::Number),
            CanonicalField::HalfLifeSeconds => self.half_life_seconds.map(CanonicalValue::Number),
            CanonicalField::InjectionDelayMinutes => {
                self.injection_delay_minutes.map(CanonicalValue::Number)
            }
        }
    }

    /// Sets a canonical field from a candidate value
    ///
    /// Returns `false` when the value kind does not match the field (a
    /// text candidate for a numeric slot or vice versa); the field is
    /// left unchanged in that case.
    pub fn set(&mut self, field: CanonicalField, value: &CanonicalValue) -> bool {
        match (field, value) {
            (CanonicalField::Radiopharmaceutical, CanonicalValue::Text(s)) => {
                self.radiopharmaceutical = Some(s.clone());
                true
            }
            (CanonicalField::InjectedActivityBq, CanonicalValue::Number(n)) => {
                self.injected_activity_bq = Some(*n);
                true
            }
            (CanonicalField::InjectionDate, CanonicalValue::Text(s)) => {
                self.injection_date = Some(s.clone());
                true
            }
            (CanonicalField::InjectionTime, CanonicalValue::Text(s)) => {
                self.injection_time = Some(s.clone());
                true
            }
            (CanonicalField::PatientWeightKg, CanonicalValue::Number(n)) => {
                self.patient_weight_kg = Some(*n);
                true
            }
            (CanonicalField::HalfLifeSeconds, CanonicalValue::Number(n)) => {
                self.half_life_seconds = Some(*n);
                true
            }
            (CanonicalField::InjectionDelayMinutes, CanonicalValue::Number(n)) => {
                self.injection_delay_minutes = Some(*n);
                true
            }
            _ => false,
        }
    }
}

/// Provenance of a backfilled canonical field
///
/// Confidence is carried for audit display only; it never gates the
/// merge decision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct FieldProvenance {
    pub field: CanonicalField,
    pub vendor: String,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip() {
        let mut fields = NormalizedFields::default();
        assert!(!fields.is_present(CanonicalField::InjectedActivityBq));

        assert!(fields.set(
            CanonicalField::InjectedActivityBq,
            &CanonicalValue::Number(3.5e8),
        ));
        assert_eq!(
            fields.get(CanonicalField::InjectedActivityBq),
            Some(CanonicalValue::Number(3.5e8))
        );
    }

    #[test]
    fn test_set_rejects_kind_mismatch() {
        let mut fields = NormalizedFields::default();
        assert!(!fields.set(
            CanonicalField::InjectedActivityBq,
            &CanonicalValue::Text("350 MBq".to_string()),
        ));
        assert!(!fields.is_present(CanonicalField::InjectedActivityBq));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(
            CanonicalField::InjectionDelayMinutes.to_string(),
            "injection_delay_minutes"
        );
        assert_eq!(CanonicalField::ALL.len(), 7);
    }
}
