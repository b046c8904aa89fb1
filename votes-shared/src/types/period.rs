//! Quarterly voting periods.
//!
//! A period is the window that scopes the per-member vote quota. Its label has
//! the form `Q{n}-{year}`, e.g. `Q1-2025`, and is what gets persisted next to
//! every vote.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::TypeError;

/// A calendar quarter of a given year, computed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    quarter: u8,
}

impl Period {
    /// Builds a period, rejecting quarters outside `1..=4`.
    pub fn new(quarter: u8, year: i32) -> Result<Self, TypeError> {
        if !(1..=4).contains(&quarter) {
            return Err(TypeError::InvalidPeriod(format!("Q{quarter}-{year}")));
        }
        Ok(Self { year, quarter })
    }

    /// Returns the period a timestamp falls into.
    ///
    /// January to March is `Q1`, April to June `Q2`, July to September `Q3`
    /// and October to December `Q4`.
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            quarter: (at.month0() / 3 + 1) as u8,
        }
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The period immediately following this one, `None` past the last representable year.
    pub fn next(&self) -> Option<Self> {
        if self.quarter == 4 {
            Some(Self { year: self.year.checked_add(1)?, quarter: 1 })
        } else {
            Some(Self { year: self.year, quarter: self.quarter + 1 })
        }
    }

    /// First instant (inclusive) of the period, `None` outside chrono's date range.
    pub fn first_instant(&self) -> Option<DateTime<Utc>> {
        let month = u32::from(self.quarter - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(self.year, month, 1)?.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&start))
    }

    /// Last representable instant of the period.
    pub fn last_instant(&self) -> Option<DateTime<Utc>> {
        Some(self.next()?.first_instant()? - Duration::nanoseconds(1))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-{}", self.quarter, self.year)
    }
}

impl FromStr for Period {
    type Err = TypeError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidPeriod(label.to_string());

        let rest = label.strip_prefix('Q').ok_or_else(invalid)?;
        let (quarter, year) = rest.split_once('-').ok_or_else(invalid)?;
        if quarter.len() != 1 || year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let quarter: u8 = quarter.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::new(quarter, year).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_quarter_boundaries_follow_calendar_quarters() {
        let cases = [
            (1, "Q1-2025"),
            (3, "Q1-2025"),
            (4, "Q2-2025"),
            (6, "Q2-2025"),
            (7, "Q3-2025"),
            (9, "Q3-2025"),
            (10, "Q4-2025"),
            (12, "Q4-2025"),
        ];
        for (month, expected) in cases {
            assert_eq!(
                Period::containing(at(2025, month, 15, 12, 0, 0)).to_string(),
                expected,
                "month {month}"
            );
        }
    }

    #[test]
    fn test_last_and_first_instant_of_adjacent_quarters_differ() {
        let last_of_q1 = at(2025, 3, 31, 23, 59, 59) + Duration::nanoseconds(999_999_999);
        let first_of_q2 = at(2025, 4, 1, 0, 0, 0);

        let before = Period::containing(last_of_q1);
        let after = Period::containing(first_of_q2);

        assert_eq!(before.to_string(), "Q1-2025");
        assert_eq!(after.to_string(), "Q2-2025");
        assert_ne!(before, after);
        assert_eq!(before.last_instant(), Some(last_of_q1));
        assert_eq!(after.first_instant(), Some(first_of_q2));
    }

    #[test]
    fn test_year_rollover() {
        let q4 = Period::containing(at(2024, 12, 31, 23, 59, 59));
        let q1 = Period::containing(at(2025, 1, 1, 0, 0, 0));
        assert_eq!(q4.to_string(), "Q4-2024");
        assert_eq!(q4.next(), Some(q1));
    }

    #[test]
    fn test_extreme_years_have_no_bounds() {
        let period: Period = "Q4-2147483647".parse().unwrap();

        assert_eq!(period.next(), None);
        assert_eq!(period.last_instant(), None);
        assert_eq!(period.first_instant(), None);
    }

    #[test]
    fn test_parse_accepts_labels() {
        let period: Period = "Q3-2026".parse().unwrap();
        assert_eq!(period.quarter(), 3);
        assert_eq!(period.year(), 2026);
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        for label in ["", "Q0-2025", "Q5-2025", "Q1-", "Q1-20a5", "q1-2025", "Q12-2025", "Q1--5", "2025-Q1"] {
            assert!(label.parse::<Period>().is_err(), "{label} should be rejected");
        }
    }

    #[test]
    fn test_serializes_as_label() {
        let period = Period::new(2, 2024).unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"Q2-2024\"");
        let parsed: Period = serde_json::from_str("\"Q2-2024\"").unwrap();
        assert_eq!(parsed, period);
    }
}
