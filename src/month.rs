//! A calendar month value (`YYYY-MM`) used by budgets and reporting.

use std::{fmt::Display, str::FromStr};

use time::{Date, Duration};

use crate::Error;

/// A calendar month, e.g. `2024-03`.
///
/// Budgets are keyed by month, and the aggregation engine reduces
/// transactions over month-long date ranges, so this type carries the
/// parse/format rules and the month arithmetic in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    month: time::Month,
}

impl Month {
    /// Create a month from its parts.
    pub fn new(year: i32, month: time::Month) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidMonth] if `raw` is not a zero-padded
    /// `YYYY-MM` string with a month between 01 and 12.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let error = || Error::InvalidMonth(raw.to_owned());

        let (year_text, month_text) = raw.split_once('-').ok_or_else(error)?;

        if year_text.len() != 4 || month_text.len() != 2 {
            return Err(error());
        }

        let year: i32 = year_text.parse().map_err(|_| error())?;
        let month_number: u8 = month_text.parse().map_err(|_| error())?;
        let month = time::Month::try_from(month_number).map_err(|_| error())?;

        Ok(Self { year, month })
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // The year and month came from a valid Date or a range-checked
        // parse, so day 1 always exists.
        Date::from_calendar_date(self.year, self.month, 1)
            .expect("day 1 exists in every month")
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        self.next().first_day() - Duration::days(1)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        match self.month {
            time::Month::December => Self {
                year: self.year + 1,
                month: time::Month::January,
            },
            month => Self {
                year: self.year,
                month: month.next(),
            },
        }
    }

    /// A human-readable label, e.g. "March 2024".
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::parse(s)
    }
}

impl PartialOrd for Month {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Month {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, u8::from(self.month)).cmp(&(other.year, u8::from(other.month)))
    }
}

#[cfg(test)]
mod month_tests {
    use time::macros::date;

    use crate::Error;

    use super::Month;

    #[test]
    fn parse_round_trips() {
        let month = Month::parse("2024-03").expect("Could not parse month");

        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["2024", "2024-13", "03-2024", "2024-3", "not a month"] {
            assert_eq!(
                Month::parse(raw),
                Err(Error::InvalidMonth(raw.to_owned())),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn month_bounds() {
        let month = Month::parse("2024-02").unwrap();

        assert_eq!(month.first_day(), date!(2024 - 02 - 01));
        // 2024 is a leap year.
        assert_eq!(month.last_day(), date!(2024 - 02 - 29));
    }

    #[test]
    fn next_rolls_over_december() {
        let month = Month::parse("2023-12").unwrap();

        assert_eq!(month.next(), Month::parse("2024-01").unwrap());
    }

    #[test]
    fn label_uses_full_month_name() {
        assert_eq!(Month::parse("2024-01").unwrap().label(), "January 2024");
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(Month::parse("2023-12").unwrap() < Month::parse("2024-01").unwrap());
        assert!(Month::parse("2024-01").unwrap() < Month::parse("2024-02").unwrap());
    }

    #[test]
    fn containing_truncates_to_month() {
        let month = Month::containing(date!(2024 - 03 - 17));

        assert_eq!(month, Month::parse("2024-03").unwrap());
    }
}
