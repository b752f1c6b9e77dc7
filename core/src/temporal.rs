//! Temporal reconciliation
//!
//! Scanners copy the acquisition date verbatim from the study date at
//! initialization, so a scan that crosses midnight can report an
//! acquisition time earlier than the study time on the same calendar
//! day. The reconciler flags that single boundary condition and offers
//! a corrected date as a derived value; the reported fields themselves
//! are always retained unmodified.

/// Boundary hours of the rollover heuristic
///
/// A rollover is suspected when the study started at or after
/// `late_study_hour` and the acquisition time reads at or before
/// `early_acquisition_hour`. The defaults (22:00 / 06:00) are a fixed
/// policy choice carried from the source system, kept as data rather
/// than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverPolicy {
    pub late_study_hour: u8,
    pub early_acquisition_hour: u8,
}

impl Default for RolloverPolicy {
    fn default() -> Self {
        Self {
            late_study_hour: 22,
            early_acquisition_hour: 6,
        }
    }
}

impl RolloverPolicy {
    /// Applies the heuristic to a study/acquisition time pair
    ///
    /// Both boundaries are inclusive. Unparseable times never flag.
    pub fn is_rollover(&self, study_time: Option<&str>, acquisition_time: Option<&str>) -> bool {
        match (hour_of(study_time), hour_of(acquisition_time)) {
            (Some(study_hour), Some(acq_hour)) => {
                study_hour >= self.late_study_hour && acq_hour <= self.early_acquisition_hour
            }
            _ => false,
        }
    }
}

fn hour_of(time: Option<&str>) -> Option<u8> {
    let text = time?.trim();
    let hour: u8 = text.get(..2)?.parse().ok()?;
    if hour < 24 {
        Some(hour)
    } else {
        None
    }
}

/// Per-object timeline derived from the reported date/time pairs
///
/// The source values are retained verbatim; the reconciler only adds
/// the rollover flag and derived accessors beside them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TemporalRecord {
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub series_date: Option<String>,
    pub series_time: Option<String>,
    pub acquisition_date: Option<String>,
    pub acquisition_time: Option<String>,
    pub content_date: Option<String>,
    pub content_time: Option<String>,
    pub injection_date: Option<String>,
    pub injection_time: Option<String>,
    pub rollover_suspected: bool,
}

impl TemporalRecord {
    /// Applies the rollover heuristic and returns the annotated record
    pub fn reconciled(mut self, policy: &RolloverPolicy) -> Self {
        self.rollover_suspected =
            policy.is_rollover(self.study_time.as_deref(), self.acquisition_time.as_deref());
        self
    }

    /// Acquisition date adjusted for a suspected rollover
    ///
    /// Derived value for consumers that need a monotonic timeline; the
    /// stored acquisition date is never replaced.
    pub fn corrected_acquisition_date(&self) -> Option<String> {
        let date = self.acquisition_date.as_deref()?;
        if self.rollover_suspected {
            add_days(date, 1)
        } else {
            Some(date.to_string())
        }
    }

    /// Minutes between injection and acquisition
    ///
    /// The study date substitutes for a missing injection or acquisition
    /// date (injection normally happens on the study day); the corrected
    /// acquisition date is used when a rollover is suspected.
    pub fn injection_delay_minutes(&self) -> Option<f64> {
        let injection_date = self
            .injection_date
            .as_deref()
            .or(self.study_date.as_deref())?;
        let acquisition_date = self
            .corrected_acquisition_date()
            .or_else(|| self.study_date.clone())?;

        let (iy, im, id) = parse_da(injection_date)?;
        let (ay, am, ad) = parse_da(&acquisition_date)?;
        let inj_seconds = seconds_of_day(self.injection_time.as_deref()?)?;
        let acq_seconds = seconds_of_day(self.acquisition_time.as_deref()?)?;

        let day_delta = days_from_civil(ay, am, ad) - days_from_civil(iy, im, id);
        Some(day_delta as f64 * 1440.0 + (acq_seconds - inj_seconds) as f64 / 60.0)
    }
}

/// Parses a DA value `YYYYMMDD`
fn parse_da(date: &str) -> Option<(i32, u32, u32)> {
    let text = date.trim();
    if text.len() < 8 || !text.as_bytes()[..8].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let year: i32 = text[..4].parse().ok()?;
    let month: u32 = text[4..6].parse().ok()?;
    let day: u32 = text[6..8].parse().ok()?;
    if (1..=12).contains(&month) && (1..=31).contains(&day) {
        Some((year, month, day))
    } else {
        None
    }
}

/// Parses a TM value `HHMMSS[.frac]`, tolerating `:` separators
fn seconds_of_day(time: &str) -> Option<i64> {
    let integral = time.trim().split('.').next()?;
    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 6 {
        return None;
    }
    let hours: i64 = digits[..2].parse().ok()?;
    let minutes: i64 = digits[2..4].parse().ok()?;
    let seconds: i64 = digits[4..6].parse().ok()?;
    if hours < 24 && minutes < 60 && seconds < 60 {
        Some(hours * 3600 + minutes * 60 + seconds)
    } else {
        None
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = i64::from((month + 9) % 12);
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = (y + i64::from(month <= 2)) as i32;
    (year, month, day)
}

/// Adds days to a DA value, carrying across month and year boundaries
fn add_days(date: &str, days: i64) -> Option<String> {
    let (year, month, day) = parse_da(date)?;
    let (ny, nm, nd) = civil_from_days(days_from_civil(year, month, day) + days);
    Some(format!("{:04}{:02}{:02}", ny, nm, nd))
}
