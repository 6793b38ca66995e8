use crate::error::AnalyticsError;
use crate::period::TimeBucket;
use core_types::{NormalizedOrder, round_money, safe_div};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Order count and revenue for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub bucket: TimeBucket,
    pub order_count: usize,
    pub revenue: Decimal,
    pub average_order_value: Decimal,
}

/// Shared cancellation signal. Long-running report stages call
/// [`CancelFlag::checkpoint`] between units of work.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    /// Checkpoints allowed to pass before the flag raises itself.
    #[cfg(test)]
    budget: Option<Arc<std::sync::atomic::AtomicUsize>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns [`AnalyticsError::Cancelled`] once the flag has been raised.
    pub fn checkpoint(&self) -> Result<(), AnalyticsError> {
        self.spend_budget();
        if self.is_cancelled() {
            Err(AnalyticsError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A flag that lets `checkpoints` checkpoints pass and then cancels itself.
    #[cfg(test)]
    pub(crate) fn tripping_after(checkpoints: usize) -> Self {
        Self {
            cancelled: Arc::default(),
            budget: Some(Arc::new(std::sync::atomic::AtomicUsize::new(checkpoints))),
        }
    }

    #[cfg(test)]
    fn spend_budget(&self) {
        if let Some(budget) = &self.budget {
            let spent = budget.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if spent.is_err() {
                self.cancel();
            }
        }
    }

    #[cfg(not(test))]
    fn spend_budget(&self) {}
}

/// Assigns each order to the bucket containing its date and totals every bucket.
///
/// Returns exactly one report per bucket, in bucket order. Orders dated
/// outside every bucket are not counted.
pub fn aggregate(orders: &[NormalizedOrder], buckets: &[TimeBucket]) -> Vec<PeriodReport> {
    let sorted = sorted_by_date(orders);
    buckets
        .iter()
        .map(|bucket| period_report(bucket, bucket_slice(&sorted, bucket)))
        .collect()
}

/// Same as [`aggregate`], but gives up with [`AnalyticsError::Cancelled`] as
/// soon as `cancel` is raised. Each bucket is totalled behind its own checkpoint.
pub fn aggregate_cancellable(
    orders: &[NormalizedOrder],
    buckets: &[TimeBucket],
    cancel: &CancelFlag,
) -> Result<Vec<PeriodReport>, AnalyticsError> {
    cancel.checkpoint()?;
    let sorted = sorted_by_date(orders);

    let mut reports = Vec::with_capacity(buckets.len());
    for (i, bucket) in buckets.iter().enumerate() {
        if let Err(e) = cancel.checkpoint() {
            tracing::debug!(completed = i, total = buckets.len(), "Aggregation cancelled.");
            return Err(e);
        }
        reports.push(period_report(bucket, bucket_slice(&sorted, bucket)));
    }
    Ok(reports)
}

fn sorted_by_date(orders: &[NormalizedOrder]) -> Vec<&NormalizedOrder> {
    let mut sorted: Vec<&NormalizedOrder> = orders.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    sorted
}

/// The run of date-sorted orders falling inside `bucket`. Buckets are
/// disjoint, so no order lands in two slices.
fn bucket_slice<'a, 'o>(sorted: &'a [&'o NormalizedOrder], bucket: &TimeBucket) -> &'a [&'o NormalizedOrder] {
    let from = sorted.partition_point(|o| o.date < bucket.start);
    let to = sorted.partition_point(|o| o.date <= bucket.end).max(from);
    &sorted[from..to]
}

fn period_report(bucket: &TimeBucket, orders: &[&NormalizedOrder]) -> PeriodReport {
    let revenue: Decimal = orders.iter().map(|o| o.approved_total).sum();
    let order_count = orders.len();
    PeriodReport {
        bucket: bucket.clone(),
        order_count,
        revenue: round_money(revenue),
        average_order_value: round_money(safe_div(revenue, Decimal::from(order_count))),
    }
}
