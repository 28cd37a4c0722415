//! Date-based eligibility filters.
//!
//! Both workflows walk `root/<year>` directories whose names are pure
//! digits. The archive workflow additionally inspects day-directory names
//! shaped like `MMDD` or `M<sep>D` and compares the resulting calendar
//! date against a month threshold; the evacuation workflow compares the
//! year number against a year threshold.

use chrono::{Months, NaiveDate};

use crate::error::ArchiveError;
use crate::model::EligibilityDate;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Old enough; process the directory
    Eligible,
    /// Well-formed but not old enough; leave it alone
    NotEligible,
    /// Name does not look like a date at all; leave it alone silently
    Skipped,
}

/// True when `s` is non-empty and entirely ASCII digits.
pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Shape gate for day-directory names: one or two leading digits, an
/// optional run of non-digits, then at least one more digit (anything may
/// follow). Names with three or more leading digits pass too, since the
/// digit run itself supplies both groups.
fn matches_day_shape(name: &str) -> bool {
    let bytes = name.as_bytes();
    let first_run = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if first_run == 0 {
        return false;
    }
    if first_run >= 3 {
        return true;
    }
    let rest = &bytes[first_run..];
    let gap = rest.iter().take_while(|b| !b.is_ascii_digit()).count();
    rest.len() > gap
}

/// Split a shape-matching day name into (month, day).
///
/// Pure-digit names: first two digits are the month, the remainder the
/// day. Otherwise the first digit run is the month and the second the
/// day; trailing text is ignored.
fn split_day_name(name: &str) -> Result<(u32, u32), String> {
    if is_all_digits(name) {
        let month = name[..2].parse::<u32>().map_err(|e| e.to_string())?;
        let day = name[2..].parse::<u32>().map_err(|e| e.to_string())?;
        Ok((month, day))
    } else {
        let mut runs = name
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty());
        let month = runs
            .next()
            .ok_or_else(|| "no month digits".to_string())?
            .parse::<u32>()
            .map_err(|e| e.to_string())?;
        let day = runs
            .next()
            .ok_or_else(|| "no day digits".to_string())?
            .parse::<u32>()
            .map_err(|e| e.to_string())?;
        Ok((month, day))
    }
}

/// Archive filter: is `year_name/day_name` older than `archive_months`
/// months before `today`?
///
/// A day name failing the shape gate is `Skipped`, never an error. A name
/// that passes the gate but yields an impossible date (month 13, day 32)
/// is a fatal `DateParse` error, aborting the run.
pub fn archive_eligibility(
    year_name: &str,
    day_name: &str,
    today: NaiveDate,
    archive_months: u32,
) -> Result<Eligibility, ArchiveError> {
    if !matches_day_shape(day_name) {
        return Ok(Eligibility::Skipped);
    }

    let date_error = |reason: String| ArchiveError::DateParse {
        year: year_name.to_string(),
        day: day_name.to_string(),
        reason,
    };

    let (month, day) = split_day_name(day_name).map_err(date_error)?;
    let year = year_name
        .parse::<i32>()
        .map_err(|e| date_error(e.to_string()))?;

    let candidate = EligibilityDate { year, month, day }
        .to_naive()
        .ok_or_else(|| date_error(format!("{:04}-{:02}-{:02} is not a calendar date", year, month, day)))?;

    let threshold = today
        .checked_sub_months(Months::new(archive_months))
        .ok_or_else(|| date_error(format!("cannot go back {} months from {}", archive_months, today)))?;

    if candidate < threshold {
        Ok(Eligibility::Eligible)
    } else {
        Ok(Eligibility::NotEligible)
    }
}

/// Evacuation filter: is the year directory at or below the threshold
/// year? Non-numeric names are `Skipped`, never errors.
pub fn evacuation_eligibility(year_name: &str, threshold_year: i32) -> Eligibility {
    if !is_all_digits(year_name) {
        return Eligibility::Skipped;
    }
    match year_name.parse::<i32>() {
        Ok(year) if year <= threshold_year => Eligibility::Eligible,
        Ok(_) => Eligibility::NotEligible,
        Err(_) => Eligibility::Skipped,
    }
}
