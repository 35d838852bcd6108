//! Inclusive calendar date ranges and the `startDate`/`endDate` query string that selects one.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// The format used for dates in query strings, e.g. "2024-01-31".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A range of calendar days where both the start and end dates are included.
///
/// The start date is never after the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start_date: Date,
    end_date: Date,
}

impl DateRange {
    /// Create a date range from `start_date` to `end_date`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `end_date` is before `start_date`.
    pub fn new(start_date: Date, end_date: Date) -> Result<Self, Error> {
        if end_date < start_date {
            return Err(Error::Validation(
                "End date must be on or after the start date".to_owned(),
            ));
        }

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Create a date range without checking the dates are in order.
    ///
    /// The caller should ensure that `start_date` is not after `end_date`,
    /// e.g. because the dates were validated before being saved.
    pub fn new_unchecked(start_date: Date, end_date: Date) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// The first day in the range.
    pub fn start(&self) -> Date {
        self.start_date
    }

    /// The last day in the range.
    pub fn end(&self) -> Date {
        self.end_date
    }

    /// The number of days in the range, counting both ends. Always at least one.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days() + 1
    }

    /// Whether `date` falls on or between the start and end dates.
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }

    /// The days common to both ranges, or `None` if they do not overlap.
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        let start_date = self.start_date.max(other.start_date);
        let end_date = self.end_date.min(other.end_date);

        if start_date > end_date {
            None
        } else {
            Some(DateRange {
                start_date,
                end_date,
            })
        }
    }
}

/// The optional date window accepted by listing and stats endpoints.
///
/// Dates are strings of the form "YYYY-MM-DD".
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// The first day of the window.
    pub start_date: Option<String>,
    /// The last day of the window.
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// Parse the query into a date range.
    ///
    /// Returns `Ok(None)` if neither date was given.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if only one of the two dates was given,
    /// if either date cannot be parsed, or if the end date is before the start date.
    pub fn into_date_range(self) -> Result<Option<DateRange>, Error> {
        match (self.start_date, self.end_date) {
            (None, None) => Ok(None),
            (Some(start_date), Some(end_date)) => {
                let start_date = parse_date(&start_date)?;
                let end_date = parse_date(&end_date)?;

                DateRange::new(start_date, end_date).map(Some)
            }
            _ => Err(Error::Validation(
                "Both startDate and endDate must be given to filter by date".to_owned(),
            )),
        }
    }
}

fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("Invalid date \"{text}\", expected YYYY-MM-DD")))
}
