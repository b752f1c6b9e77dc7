use std::collections::BTreeMap;
use std::fmt;

/// Series descriptions matching these fragments mark positioning scans,
/// which never represent a study in aggregate statistics
const NON_DIAGNOSTIC_FRAGMENTS: [&str; 3] = ["localizer", "scout", "topogram"];

/// Per-series aggregate, as read back from the persisted store
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SeriesSummary {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub description: Option<String>,
    pub modality: Option<String>,
    pub instance_count: u32,
    pub series_number: Option<i32>,
}

impl SeriesSummary {
    /// Whether the description names a non-diagnostic positioning role
    pub fn is_non_diagnostic(&self) -> bool {
        match &self.description {
            Some(desc) => {
                let lower = desc.to_lowercase();
                NON_DIAGNOSTIC_FRAGMENTS.iter().any(|f| lower.contains(f))
            }
            None => false,
        }
    }

    /// Rank of the modality for representative selection; lower is
    /// preferred
    fn modality_rank(&self) -> u8 {
        match self.modality.as_deref() {
            Some("PT") => 0,
            Some("NM") => 1,
            Some("CT") => 2,
            Some("MR") => 3,
            _ => 4,
        }
    }
}

/// The rule that settled a representative choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum SelectionReason {
    /// The study had exactly one series
    SoleCandidate,
    /// Excluding positioning scans left one series
    NonDiagnosticExclusion,
    /// The modality ranking left one series
    ModalityPriority,
    /// The greatest instance count left one series
    InstanceCount,
    /// Lowest series number among remaining ties
    SeriesNumber,
    /// Final tie-break on series identifier ordering
    SeriesUid,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectionReason::SoleCandidate => "sole-candidate",
            SelectionReason::NonDiagnosticExclusion => "non-diagnostic-exclusion",
            SelectionReason::ModalityPriority => "modality-priority",
            SelectionReason::InstanceCount => "instance-count",
            SelectionReason::SeriesNumber => "series-number",
            SelectionReason::SeriesUid => "series-uid",
        };
        f.write_str(s)
    }
}

/// The representative series chosen for a study
///
/// A derived view over the current series set: recomputing after new
/// series arrive may change the choice, which callers must tolerate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct RepresentativeChoice {
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub reason: SelectionReason,
}

/// Chooses the representative among one study's series
///
/// Policy, evaluated in order until one candidate remains: exclude
/// positioning scans, prefer the modality ranking, prefer the greatest
/// instance count, tie-break by lowest series number and finally by
/// series identifier. Pure function of the input set.
pub fn select_representative(series: &[SeriesSummary]) -> Option<RepresentativeChoice> {
    let first = series.first()?;
    let study_uid = first.study_instance_uid.clone();
    if series.len() == 1 {
        return Some(RepresentativeChoice {
            study_instance_uid: study_uid,
            series_instance_uid: first.series_instance_uid.clone(),
            reason: SelectionReason::SoleCandidate,
        });
    }

    // Phase 1: drop positioning scans, unless that would drop everything
    let mut candidates: Vec<&SeriesSummary> =
        series.iter().filter(|s| !s.is_non_diagnostic()).collect();
    if candidates.is_empty() {
        candidates = series.iter().collect();
    }
    if let [only] = candidates.as_slice() {
        return Some(choice(study_uid, only, SelectionReason::NonDiagnosticExclusion));
    }

    // Phase 2: best modality rank
    let best_rank = candidates.iter().map(|s| s.modality_rank()).min()?;
    candidates.retain(|s| s.modality_rank() == best_rank);
    if let [only] = candidates.as_slice() {
        return Some(choice(study_uid, only, SelectionReason::ModalityPriority));
    }

    // Phase 3: greatest instance count
    let max_count = candidates.iter().map(|s| s.instance_count).max()?;
    candidates.retain(|s| s.instance_count == max_count);
    if let [only] = candidates.as_slice() {
        return Some(choice(study_uid, only, SelectionReason::InstanceCount));
    }

    // Phase 4: lowest series number; absent numbers sort last
    let min_number = candidates
        .iter()
        .map(|s| s.series_number.unwrap_or(i32::MAX))
        .min()?;
    candidates.retain(|s| s.series_number.unwrap_or(i32::MAX) == min_number);
    if let [only] = candidates.as_slice() {
        return Some(choice(study_uid, only, SelectionReason::SeriesNumber));
    }

    // Deterministic last resort
    let only = candidates
        .into_iter()
        .min_by(|a, b| a.series_instance_uid.cmp(&b.series_instance_uid))?;
    Some(choice(study_uid, only, SelectionReason::SeriesUid))
}

fn choice(
    study_uid: String,
    series: &SeriesSummary,
    reason: SelectionReason,
) -> RepresentativeChoice {
    RepresentativeChoice {
        study_instance_uid: study_uid,
        series_instance_uid: series.series_instance_uid.clone(),
        reason,
    }
}

/// Chooses one representative per study over a mixed series list
///
/// Output is ordered by study identifier, so repeated runs over the
/// same input produce identical results.
pub fn select_representatives(series: &[SeriesSummary]) -> Vec<RepresentativeChoice> {
    let mut by_study: BTreeMap<&str, Vec<SeriesSummary>> = BTreeMap::new();
    for s in series {
        by_study
            .entry(s.study_instance_uid.as_str())
            .or_default()
            .push(s.clone());
    }
    by_study
        .values()
        .filter_map(|group| select_representative(group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(
        series_uid: &str,
        description: &str,
        modality: &str,
        instance_count: u32,
        series_number: i32,
    ) -> SeriesSummary {
        SeriesSummary {
            study_instance_uid: "1.2.3".to_string(),
            series_instance_uid: series_uid.to_string(),
            description: Some(description.to_string()),
            modality: Some(modality.to_string()),
            instance_count,
            series_number: Some(series_number),
        }
    }

    #[test]
    fn test_scout_excluded_then_instance_count_decides() {
        let input = vec![
            series("1.2.3.1", "Scout", "CT", 3, 1),
            series("1.2.3.2", "PET WB", "PT", 200, 2),
            series("1.2.3.3", "PET WB", "PT", 50, 3),
        ];
        let chosen = select_representative(&input).unwrap();
        assert_eq!(chosen.series_instance_uid, "1.2.3.2");
        assert_eq!(chosen.reason, SelectionReason::InstanceCount);
    }

    #[test]
    fn test_modality_priority() {
        let input = vec![
            series("1.2.3.1", "CT WB", "CT", 400, 1),
            series("1.2.3.2", "PET WB", "PT", 200, 2),
        ];
        let chosen = select_representative(&input).unwrap();
        assert_eq!(chosen.series_instance_uid, "1.2.3.2");
        assert_eq!(chosen.reason, SelectionReason::ModalityPriority);
    }

    #[test]
    fn test_series_number_tie_break() {
        let input = vec![
            series("1.2.3.9", "PET WB", "PT", 100, 4),
            series("1.2.3.8", "PET WB", "PT", 100, 2),
        ];
        let chosen = select_representative(&input).unwrap();
        assert_eq!(chosen.series_instance_uid, "1.2.3.8");
        assert_eq!(chosen.reason, SelectionReason::SeriesNumber);
    }

    #[test]
    fn test_all_non_diagnostic_falls_back_to_full_set() {
        let input = vec![
            series("1.2.3.1", "Localizer", "CT", 3, 1),
            series("1.2.3.2", "Scout head", "CT", 2, 2),
        ];
        let chosen = select_representative(&input).unwrap();
        // Exclusion would empty the set, so the policy continues over
        // all series; equal modality, instance count decides
        assert_eq!(chosen.series_instance_uid, "1.2.3.1");
        assert_eq!(chosen.reason, SelectionReason::InstanceCount);
    }

    #[test]
    fn test_sole_candidate() {
        let input = vec![series("1.2.3.1", "PET WB", "PT", 10, 1)];
        let chosen = select_representative(&input).unwrap();
        assert_eq!(chosen.reason, SelectionReason::SoleCandidate);
    }

    #[test]
    fn test_exclusion_leaving_one() {
        let input = vec![
            series("1.2.3.1", "Topogram", "CT", 3, 1),
            series("1.2.3.2", "CT WB", "CT", 120, 2),
        ];
        let chosen = select_representative(&input).unwrap();
        assert_eq!(chosen.series_instance_uid, "1.2.3.2");
        assert_eq!(chosen.reason, SelectionReason::NonDiagnosticExclusion);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(select_representative(&[]), None);
    }

    #[test]
    fn test_recompute_after_new_series_may_change_choice() {
        let mut input = vec![series("1.2.3.1", "PET WB", "PT", 50, 1)];
        let before = select_representative(&input).unwrap();
        assert_eq!(before.series_instance_uid, "1.2.3.1");

        input.push(series("1.2.3.2", "PET WB corrected", "PT", 300, 2));
        let after = select_representative(&input).unwrap();
        assert_eq!(after.series_instance_uid, "1.2.3.2");
    }

    #[test]
    fn test_one_representative_per_study() {
        let mut a = series("1.2.3.1", "PET WB", "PT", 50, 1);
        a.study_instance_uid = "study-a".to_string();
        let mut b = series("1.2.3.2", "PET WB", "PT", 60, 1);
        b.study_instance_uid = "study-b".to_string();
        let mut c = series("1.2.3.3", "CT WB", "CT", 70, 2);
        c.study_instance_uid = "study-b".to_string();

        let choices = select_representatives(&[a, b, c]);
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].study_instance_uid, "study-a");
        assert_eq!(choices[1].study_instance_uid, "study-b");
        assert_eq!(choices[1].series_instance_uid, "1.2.3.2");
    }
}
