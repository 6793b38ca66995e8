use crate::error::AnalyticsError;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use core_types::{Clock, Granularity};
use serde::Serialize;
use std::sync::Arc;

/// Days covered by the default (custom) range when no dates are given.
const DEFAULT_RANGE_DAYS: u64 = 30;

/// One aggregation bucket. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Display label, "Jan 5" for days and "Jan 2024" for months.
    pub label: String,
    /// Sortable calendar key, "2024-01-05" for days and "2024-01" for months.
    pub key: String,
}

impl TimeBucket {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// The overall window of a report, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Produces the ordered, contiguous, non-overlapping buckets of a report.
#[derive(Debug, Clone)]
pub struct PeriodGenerator {
    clock: Arc<dyn Clock>,
}

impl PeriodGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Fills in whichever end of the window the caller left open.
    ///
    /// - weekly: Monday 00:00 of the current week through the following Sunday;
    /// - monthly: the calendar month containing the start;
    /// - annually: the calendar year containing the start;
    /// - default: the trailing 30 days ending today.
    pub fn resolve_range(
        &self,
        granularity: Granularity,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DateRange, AnalyticsError> {
        let today = self.clock.now().date_naive();

        let range = match granularity {
            Granularity::Weekly => {
                let start = match start {
                    Some(s) => s,
                    None => start_of_day(monday_of(today)?),
                };
                let end = match end {
                    Some(e) => e,
                    None => end_of_day(add_days(start.date_naive(), 6)?)?,
                };
                DateRange { start, end }
            }
            Granularity::Monthly => {
                let start = match start {
                    Some(s) => s,
                    None => start_of_day(first_of_month(today.year(), today.month())?),
                };
                let end = match end {
                    Some(e) => e,
                    None => end_of_day(last_of_month(start.year(), start.month())?)?,
                };
                DateRange { start, end }
            }
            Granularity::Annually => {
                let start = match start {
                    Some(s) => s,
                    None => start_of_day(first_of_month(today.year(), 1)?),
                };
                let end = match end {
                    Some(e) => e,
                    None => end_of_day(last_of_month(start.year(), 12)?)?,
                };
                DateRange { start, end }
            }
            Granularity::Default => {
                let end = match end {
                    Some(e) => e,
                    None => end_of_day(today)?,
                };
                let start = match start {
                    Some(s) => s,
                    None => start_of_day(sub_days(end.date_naive(), DEFAULT_RANGE_DAYS - 1)?),
                };
                DateRange { start, end }
            }
        };

        Ok(range)
    }

    /// Generates the buckets for `[start, end]` at the given granularity.
    ///
    /// An inverted window (`start > end`) yields no buckets.
    pub fn generate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Vec<TimeBucket>, AnalyticsError> {
        if start > end {
            return Ok(Vec::new());
        }

        let buckets = match granularity {
            Granularity::Weekly => weekly(start, end)?,
            Granularity::Monthly => monthly(start, end)?,
            Granularity::Annually => annually(start, end)?,
            Granularity::Default => daily(start, end)?,
        };

        tracing::debug!(%granularity, %start, %end, buckets = buckets.len(), "Generated period buckets.");
        Ok(buckets)
    }
}

/// Seven day buckets from the start day, stopping early once a day begins after `end`.
fn weekly(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TimeBucket>, AnalyticsError> {
    let first = start.date_naive();
    let mut buckets = Vec::with_capacity(7);
    for offset in 0..7 {
        let day = add_days(first, offset)?;
        if start_of_day(day) > end {
            break;
        }
        buckets.push(day_bucket(day, end)?);
    }
    Ok(buckets)
}

/// Day buckets for the month containing `start`, keeping only days that begin inside the window.
fn monthly(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TimeBucket>, AnalyticsError> {
    let first = first_of_month(start.year(), start.month())?;
    let last = last_of_month(start.year(), start.month())?;

    let mut buckets = Vec::with_capacity(31);
    for day in first.iter_days().take_while(|d| *d <= last) {
        let day_start = start_of_day(day);
        if day_start < start || day_start > end {
            continue;
        }
        buckets.push(day_bucket(day, end)?);
    }
    Ok(buckets)
}

/// Month buckets for the year containing `start`, each clipped to its overlap with the window.
fn annually(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TimeBucket>, AnalyticsError> {
    let year = start.year();
    let mut buckets = Vec::with_capacity(12);
    for month in 1..=12 {
        let first = first_of_month(year, month)?;
        let month_start = start_of_day(first);
        let month_end = end_of_day(last_of_month(year, month)?)?;
        if month_end < start || month_start > end {
            continue;
        }
        buckets.push(TimeBucket {
            start: month_start.max(start),
            end: month_end.min(end),
            label: first.format("%b %Y").to_string(),
            key: first.format("%Y-%m").to_string(),
        });
    }
    Ok(buckets)
}

/// One bucket per calendar day from the start day to the end day.
fn daily(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TimeBucket>, AnalyticsError> {
    let last = end.date_naive();
    start
        .date_naive()
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|day| day_bucket(day, end))
        .collect()
}

/// A whole-day bucket whose end never passes `window_end`. The start stays at
/// midnight even on the first day of a window that opens mid-day.
fn day_bucket(day: NaiveDate, window_end: DateTime<Utc>) -> Result<TimeBucket, AnalyticsError> {
    Ok(TimeBucket {
        start: start_of_day(day),
        end: end_of_day(day)?.min(window_end),
        label: day.format("%b %-d").to_string(),
        key: day.format("%Y-%m-%d").to_string(),
    })
}

/// 00:00:00.000 UTC on `day`.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 UTC on `day`, the last instant a bucket covers.
pub fn end_of_day(day: NaiveDate) -> Result<DateTime<Utc>, AnalyticsError> {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AnalyticsError::DateOutOfRange(format!("end of {day}")))
}

fn add_days(day: NaiveDate, days: u64) -> Result<NaiveDate, AnalyticsError> {
    day.checked_add_days(Days::new(days))
        .ok_or_else(|| AnalyticsError::DateOutOfRange(format!("{day} + {days} days")))
}

fn sub_days(day: NaiveDate, days: u64) -> Result<NaiveDate, AnalyticsError> {
    day.checked_sub_days(Days::new(days))
        .ok_or_else(|| AnalyticsError::DateOutOfRange(format!("{day} - {days} days")))
}

fn monday_of(day: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    sub_days(day, u64::from(day.weekday().num_days_from_monday()))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AnalyticsError::DateOutOfRange(format!("{year}-{month:02}-01")))
}

fn last_of_month(year: i32, month: u32) -> Result<NaiveDate, AnalyticsError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| AnalyticsError::DateOutOfRange(format!("last day of {year}-{month:02}")))
}
