use crate::error::{Result, SeriesBuilderError};
use crate::schema::Quarter;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The fiscal quarter a calendar date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub fiscal_year: i32,
    pub quarter: Quarter,
}

/// Mapping from calendar dates to fiscal years and quarters.
///
/// A fiscal year is labeled by the calendar year it ends in: with the
/// default April start, FY2025 runs 2024-04-01 through 2025-03-31 and
/// Q1 covers April-June. The start month is configurable; the boundary
/// day is always the 1st of the start month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self {
            start_month: Self::DEFAULT_START_MONTH,
        }
    }
}

impl FiscalCalendar {
    /// April, the convention observed in the source data.
    pub const DEFAULT_START_MONTH: u32 = 4;

    pub fn new(start_month: u32) -> Result<Self> {
        if !(1..=12).contains(&start_month) {
            return Err(SeriesBuilderError::InvalidFiscalStartMonth(start_month));
        }
        Ok(Self { start_month })
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// The fiscal year `date` falls in, labeled by the calendar year the
    /// fiscal year ends in. A January start degenerates to the calendar
    /// year itself.
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        let start_year = if date.month() >= self.start_month {
            date.year()
        } else {
            date.year() - 1
        };

        if self.start_month == 1 {
            start_year
        } else {
            start_year + 1
        }
    }

    /// The fiscal quarter `date` falls in.
    pub fn quarter(&self, date: NaiveDate) -> Quarter {
        let months_into_year = (date.month() + 12 - self.start_month) % 12;
        match months_into_year / 3 {
            0 => Quarter::Q1,
            1 => Quarter::Q2,
            2 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    /// The single funnel for calendar-to-fiscal conversion; all period
    /// math goes through here.
    pub fn fiscal_period(&self, date: NaiveDate) -> FiscalPeriod {
        FiscalPeriod {
            fiscal_year: self.fiscal_year(date),
            quarter: self.quarter(date),
        }
    }
}
