use crate::schema::{Granularity, Quarter};
use crate::utils::{month_label, next_month, parse_fiscal_year, parse_flexible_date};
use chrono::Datelike;
use serde::{Serialize, Serializer};
use std::fmt;

/// A granularity-specific period key.
///
/// Ordering is total and chronological within a granularity; a label
/// sequence never mixes variants, so the derived cross-variant order is
/// never observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Month { year: i32, month: u32 },
    Quarter { fiscal_year: i32, quarter: Quarter },
    FiscalYear { fiscal_year: i32 },
}

impl Period {
    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Month { .. } => Granularity::Month,
            Period::Quarter { .. } => Granularity::Quarter,
            Period::FiscalYear { .. } => Granularity::FiscalYear,
        }
    }

    /// The immediately following period at the same granularity.
    pub fn succ(&self) -> Period {
        match *self {
            Period::Month { year, month } => {
                let (year, month) = next_month(year, month);
                Period::Month { year, month }
            }
            Period::Quarter {
                fiscal_year,
                quarter,
            } => Period::Quarter {
                fiscal_year: if quarter == Quarter::Q4 {
                    fiscal_year + 1
                } else {
                    fiscal_year
                },
                quarter: quarter.next(),
            },
            Period::FiscalYear { fiscal_year } => Period::FiscalYear {
                fiscal_year: fiscal_year + 1,
            },
        }
    }

    /// The chart label for this period.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Period::Month { year, month } => write!(f, "{}", month_label(year, month)),
            Period::Quarter {
                fiscal_year,
                quarter,
            } => write!(f, "{} FY{}", quarter, fiscal_year),
            Period::FiscalYear { fiscal_year } => write!(f, "FY{}", fiscal_year),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a range bound in the granularity's native representation,
/// falling back through the formats the hosts have historically sent.
/// Returns `None` on anything unrecognized; the caller degrades to
/// data-derived labels instead of failing.
pub fn parse_bound(granularity: Granularity, input: &str) -> Option<Period> {
    match granularity {
        Granularity::Month => parse_month_bound(input),
        Granularity::Quarter => parse_quarter_bound(input),
        Granularity::FiscalYear => parse_fiscal_year_bound(input),
    }
}

/// The complete inclusive period sequence from `start` to `end`. Empty
/// when `start > end`.
pub fn complete_range(start: Period, end: Period) -> Vec<Period> {
    let mut periods = Vec::new();
    let mut current = start;
    while current <= end {
        periods.push(current);
        current = current.succ();
    }
    periods
}

// "2024-01" natively, plus the shared flexible-date fallbacks ("Jan-24",
// "01 April 2024", ...).
fn parse_month_bound(input: &str) -> Option<Period> {
    parse_flexible_date(input).map(|date| Period::Month {
        year: date.year(),
        month: date.month(),
    })
}

// "Q1-FY2025" natively, plus "Q1 FY2025" and "2025 Q1".
fn parse_quarter_bound(input: &str) -> Option<Period> {
    let cleaned = input.trim().replace('-', " ");
    let mut quarter = None;
    let mut fiscal_year = None;

    for token in cleaned.split_whitespace() {
        if let Ok(parsed) = token.parse::<Quarter>() {
            quarter = Some(parsed);
        } else if let Some(year) = parse_fiscal_year(token) {
            fiscal_year = Some(year);
        } else {
            return None;
        }
    }

    Some(Period::Quarter {
        fiscal_year: fiscal_year?,
        quarter: quarter?,
    })
}

// "FY2025" natively, plus a bare "2025".
fn parse_fiscal_year_bound(input: &str) -> Option<Period> {
    parse_fiscal_year(input).map(|fiscal_year| Period::FiscalYear { fiscal_year })
}
