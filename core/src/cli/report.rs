use crate::pipeline::BatchSummary;
use crate::selection::RepresentativeChoice;
use std::fmt;

/// Text report formatter for a batch run
pub struct BatchReport<'a> {
    summary: &'a BatchSummary,
    representatives: &'a [RepresentativeChoice],
}

impl<'a> BatchReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a BatchSummary, representatives: &'a [RepresentativeChoice]) -> Self {
        Self {
            summary,
            representatives,
        }
    }
}

impl<'a> fmt::Display for BatchReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Summary")?;
        writeln!(f, "=============")?;
        writeln!(f)?;
        writeln!(f, "Stored:           {}", self.summary.processed)?;
        writeln!(f, "Duplicate series: {}", self.summary.duplicate_series)?;
        writeln!(f, "Failed:           {}", self.summary.failed)?;
        writeln!(f)?;

        writeln!(f, "Representative Series")?;
        writeln!(f, "---------------------")?;
        if self.representatives.is_empty() {
            writeln!(f, "(none)")?;
        }
        for choice in self.representatives {
            writeln!(
                f,
                "{} -> {} ({})",
                choice.study_instance_uid, choice.series_instance_uid, choice.reason
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionReason;

    #[test]
    fn test_report_format() {
        let summary = BatchSummary {
            processed: 5,
            duplicate_series: 2,
            failed: 1,
        };
        let representatives = vec![RepresentativeChoice {
            study_instance_uid: "1.2.3".to_string(),
            series_instance_uid: "1.2.3.4".to_string(),
            reason: SelectionReason::InstanceCount,
        }];

        let output = BatchReport::new(&summary, &representatives).to_string();
        assert!(output.contains("Stored:           5"));
        assert!(output.contains("1.2.3 -> 1.2.3.4 (instance-count)"));
    }

    #[test]
    fn test_report_without_representatives() {
        let summary = BatchSummary::default();
        let output = BatchReport::new(&summary, &[]).to_string();
        assert!(output.contains("(none)"));
    }
}
