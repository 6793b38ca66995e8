use crate::period::start_of_day;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Clock, Product, RawOrder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stock and sales for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPoint {
    pub date: NaiveDate,
    /// Stock at the start of the day, floored at zero.
    pub stock: i64,
    pub sold: i64,
    /// The replayed running total before flooring. Negative when oversold.
    #[serde(skip)]
    pub running_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySeries {
    /// Stock as of now, from the whole history. Not derived from `series`.
    pub current_stock: i64,
    pub series: Vec<InventoryPoint>,
    /// Running total after the last replayed day, before flooring.
    #[serde(skip)]
    pub unclamped_stock: i64,
}

/// Rebuilds a product's daily stock from its initial level and its approved sales.
#[derive(Debug, Clone)]
pub struct InventoryReconstructor {
    clock: Arc<dyn Clock>,
}

impl InventoryReconstructor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Replays `history` for every day in `[start, end]`.
    ///
    /// `start` never precedes the product's creation day. Each point shows
    /// the stock before that day's sales, then the day's sales are taken off.
    /// `current_stock` is computed separately over all sales up to now, so it
    /// can disagree with the last point when `end` is in the past.
    pub fn reconstruct(
        &self,
        product: &Product,
        history: &[RawOrder],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> InventorySeries {
        let sales = approved_sales(product, history);

        let first_day = start.date_naive().max(product.created_at.date_naive());
        let last_day = end.date_naive();
        let window_start = start_of_day(first_day);

        let sold_before_start: i64 = sales
            .iter()
            .filter(|(at, _)| *at >= product.created_at && *at < window_start)
            .map(|(_, qty)| qty)
            .sum();

        let mut sold_per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for (at, qty) in &sales {
            *sold_per_day.entry(at.date_naive()).or_default() += qty;
        }

        let mut running_stock = product.stock_quantity - sold_before_start;
        let mut series = Vec::new();
        for day in first_day.iter_days().take_while(|d| *d <= last_day) {
            let sold_today = sold_per_day.get(&day).copied().unwrap_or(0);
            series.push(InventoryPoint {
                date: day,
                stock: running_stock.max(0),
                sold: sold_today,
                running_stock,
            });
            // Subtracting zero would change nothing; the guard only skips a no-op.
            if sold_today > 0 {
                running_stock -= sold_today;
            }
        }

        if series.iter().any(|p| p.running_stock < 0) || running_stock < 0 {
            tracing::warn!(
                product_id = product.id,
                unclamped_stock = running_stock,
                "Replayed sales exceed recorded stock."
            );
        }

        let now = self.clock.now();
        let sold_to_date: i64 = sales
            .iter()
            .filter(|(at, _)| *at >= product.created_at && *at <= now)
            .map(|(_, qty)| qty)
            .sum();

        InventorySeries {
            current_stock: (product.stock_quantity - sold_to_date).max(0),
            series,
            unclamped_stock: running_stock,
        }
    }
}

/// `(order date, quantity)` of every approved line for the product.
fn approved_sales(product: &Product, history: &[RawOrder]) -> Vec<(DateTime<Utc>, i64)> {
    history
        .iter()
        .flat_map(|raw| {
            raw.items
                .iter()
                .filter(|line| {
                    line.item.product_id == product.id && line.item.approval_status.is_approved()
                })
                .map(|line| (raw.order.date, i64::from(line.item.quantity)))
        })
        .collect()
}
