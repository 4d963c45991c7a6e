//! A calendar month, used to group expenses and budgets.

use std::fmt::Display;

use time::{Date, Month};

use crate::Error;

/// One calendar month of a specific year, e.g. October 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    /// The month of the year.
    pub month: Month,
    /// The calendar year.
    pub year: i32,
}

impl Period {
    /// Create the period for `month` of `year`.
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// The period that contains `date`.
    pub fn from_date(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// The month as a number from 1 to 12.
    pub fn month_number(&self) -> u8 {
        u8::from(self.month)
    }

    /// The first day of the period.
    ///
    /// Expenses in the period fall in the half-open range from this day up to
    /// the first day of the next month.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDate] if the year is out of range.
    pub fn first_day(&self) -> Result<Date, Error> {
        Date::from_calendar_date(self.year, self.month, 1)
            .map_err(|error| Error::InvalidDate(error.to_string()))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
