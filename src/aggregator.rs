use crate::fiscal::{FiscalCalendar, FiscalPeriod};
use crate::period::{complete_range, parse_bound, Period};
use crate::schema::{Granularity, RevenueRecord};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Series key returned by [`PeriodAggregator::build_series`] when the
/// data is not grouped by pharmacy.
pub const TOTAL_SERIES_KEY: &str = "total";

/// Source of "today" for live-period selection. Injected so summaries are
/// reproducible in tests.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Direction of a period-over-period change. An exactly-zero rounded
/// change reports `Decrease`, matching the behavior the dashboards
/// already display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increase,
    Decrease,
}

/// One period in a summary series.
///
/// `percentage_change` is absent for the first point and whenever the
/// previous period's total is zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub total: f64,
    pub percentage_change: Option<f64>,
    pub change_direction: Option<ChangeDirection>,
}

/// Ordered summary series plus current-period selection.
///
/// `current_period` is the live period when it appears in `points`,
/// otherwise the most recent point; both are `None` for an empty series.
/// `live_period` is what "now" maps to under the granularity, regardless
/// of whether any data exists for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub points: Vec<SeriesPoint>,
    pub current_period: Option<Period>,
    pub current_total: Option<f64>,
    pub live_period: Period,
}

/// Turns a filtered record collection into ordered labels, aligned
/// per-pharmacy series and period-over-period summaries.
///
/// Every call computes fresh output from its inputs; nothing is cached
/// between calls and the records are never mutated.
pub struct PeriodAggregator {
    fiscal: FiscalCalendar,
    clock: Box<dyn Clock + Send + Sync>,
}

impl Default for PeriodAggregator {
    fn default() -> Self {
        Self::new(FiscalCalendar::default())
    }
}

impl PeriodAggregator {
    pub fn new(fiscal: FiscalCalendar) -> Self {
        Self::with_clock(fiscal, Box::new(SystemClock))
    }

    pub fn with_clock(fiscal: FiscalCalendar, clock: Box<dyn Clock + Send + Sync>) -> Self {
        Self { fiscal, clock }
    }

    pub fn fiscal_calendar(&self) -> &FiscalCalendar {
        &self.fiscal
    }

    /// Ordered, de-duplicated period sequence for the records.
    ///
    /// When both range bounds parse, the result is the complete inclusive
    /// sequence between them, so periods without data stay visible.
    /// Malformed or missing bounds degrade to the sorted set of periods
    /// observed in the records; empty records yield an empty sequence.
    pub fn build_labels(
        &self,
        granularity: Granularity,
        records: &[RevenueRecord],
        range_start: Option<&str>,
        range_end: Option<&str>,
    ) -> Vec<Period> {
        if records.is_empty() {
            return Vec::new();
        }

        let parsed_start = range_start.and_then(|bound| parse_bound(granularity, bound));
        let parsed_end = range_end.and_then(|bound| parse_bound(granularity, bound));

        if let (Some(start), Some(end)) = (parsed_start, parsed_end) {
            if start <= end {
                return complete_range(start, end);
            }
            debug!(
                "range bounds out of order ({} > {}), using observed periods",
                start, end
            );
        }

        let observed: BTreeSet<Period> = records
            .iter()
            .map(|record| self.period_of(record, granularity))
            .collect();
        observed.into_iter().collect()
    }

    /// One summed series per pharmacy (or a single `"total"` series),
    /// positionally aligned to `labels`. Periods a series has no data
    /// for report `0.0`, so all series keep the same length.
    pub fn build_series(
        &self,
        granularity: Granularity,
        records: &[RevenueRecord],
        labels: &[Period],
        by_pharmacy: bool,
    ) -> BTreeMap<String, Vec<f64>> {
        let mut totals: BTreeMap<(String, Period), f64> = BTreeMap::new();
        let mut keys: BTreeSet<String> = BTreeSet::new();

        for record in records {
            let key = if by_pharmacy {
                record.pharmacy.clone()
            } else {
                TOTAL_SERIES_KEY.to_string()
            };
            let period = self.period_of(record, granularity);
            *totals.entry((key.clone(), period)).or_insert(0.0) += record.value;
            keys.insert(key);
        }

        keys.into_iter()
            .map(|key| {
                let data: Vec<f64> = labels
                    .iter()
                    .map(|period| {
                        totals
                            .get(&(key.clone(), *period))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect();
                (key, data)
            })
            .collect()
    }

    /// Summary series with period-over-period percentage change.
    ///
    /// Walks the ordered totals left to right; change for a point is
    /// relative to the immediately preceding total and is undefined when
    /// that total is zero or negative. Changes are rounded to one
    /// decimal place before the direction is decided.
    pub fn build_percentage_series(
        &self,
        granularity: Granularity,
        records: &[RevenueRecord],
        range_start: Option<&str>,
        range_end: Option<&str>,
    ) -> PeriodSummary {
        let live_period = self.live_period(granularity);
        let labels = self.build_labels(granularity, records, range_start, range_end);
        let series = self.build_series(granularity, records, &labels, false);
        let totals = series.get(TOTAL_SERIES_KEY).cloned().unwrap_or_default();

        let mut points = Vec::with_capacity(labels.len());
        let mut previous: Option<f64> = None;

        for (period, total) in labels.into_iter().zip(totals) {
            let percentage_change = match previous {
                Some(prev) if prev > 0.0 => {
                    Some(round_one_decimal((total - prev) / prev * 100.0))
                }
                _ => None,
            };
            let change_direction = percentage_change.map(|change| {
                if change > 0.0 {
                    ChangeDirection::Increase
                } else {
                    ChangeDirection::Decrease
                }
            });

            points.push(SeriesPoint {
                period,
                total,
                percentage_change,
                change_direction,
            });
            previous = Some(total);
        }

        let current = points
            .iter()
            .find(|point| point.period == live_period)
            .or_else(|| points.last())
            .map(|point| (point.period, point.total));

        PeriodSummary {
            current_period: current.map(|(period, _)| period),
            current_total: current.map(|(_, total)| total),
            live_period,
            points,
        }
    }

    /// What "now" maps to under the granularity.
    pub fn live_period(&self, granularity: Granularity) -> Period {
        let today = self.clock.today();
        match granularity {
            Granularity::Month => Period::Month {
                year: today.year(),
                month: today.month(),
            },
            Granularity::Quarter => {
                let FiscalPeriod {
                    fiscal_year,
                    quarter,
                } = self.fiscal.fiscal_period(today);
                Period::Quarter {
                    fiscal_year,
                    quarter,
                }
            }
            Granularity::FiscalYear => Period::FiscalYear {
                fiscal_year: self.fiscal.fiscal_year(today),
            },
        }
    }

    fn period_of(&self, record: &RevenueRecord, granularity: Granularity) -> Period {
        match granularity {
            Granularity::Month => Period::Month {
                year: record.date.year(),
                month: record.date.month(),
            },
            Granularity::Quarter => Period::Quarter {
                fiscal_year: record.fiscal_year,
                quarter: record.quarter,
            },
            Granularity::FiscalYear => Period::FiscalYear {
                fiscal_year: record.fiscal_year,
            },
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
