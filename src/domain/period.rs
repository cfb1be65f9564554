use crate::error::LedgerError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One billing cycle: a calendar (year, month) pair.
///
/// Periods are never stored on their own; they are derived from enrollment
/// dates and used as the key of a payment record. Field order gives the
/// derived `Ord` chronological meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    year: i32,
    month: u32,
}

/// Unchecked wire form; stored records go back through [`Period::new`].
#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for Period {
    type Error = LedgerError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(LedgerError::InvalidInput(format!(
                "year {year} is out of range"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period a calendar date falls in; day-of-month is discarded.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every period from `start` through `end`, inclusive, ascending.
    /// Yields nothing when `start` is after `end`.
    pub fn range_inclusive(start: Period, end: Period) -> impl Iterator<Item = Period> {
        std::iter::successors(Some(start), |p| Some(p.next())).take_while(move |p| *p <= end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    /// Parses the `YYYY-MM` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("'{s}' is not a YYYY-MM period"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}
