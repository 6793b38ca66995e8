use core_types::{NormalizedOrder, round_money, safe_div};
use rust_decimal::Decimal;
use serde::Serialize;

/// Unrounded totals for one half of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HalfTotals {
    pub orders: usize,
    pub revenue: Decimal,
}

impl HalfTotals {
    pub fn from_orders(orders: &[&NormalizedOrder]) -> Self {
        Self {
            orders: orders.len(),
            revenue: orders.iter().map(|o| o.approved_total).sum(),
        }
    }

    fn avg_order_value(&self) -> Decimal {
        safe_div(self.revenue, Decimal::from(self.orders))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfMetrics {
    pub orders: usize,
    pub revenue: Decimal,
    pub avg_order_value: Decimal,
}

/// Percentage change per metric, current half against previous half.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRates {
    pub orders: Decimal,
    pub revenue: Decimal,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub previous_period: HalfMetrics,
    pub current_period: HalfMetrics,
    pub growth: GrowthRates,
}

/// Splits the orders, sorted by date, at `floor(n / 2)` and compares the halves.
///
/// The first half is reported as `previous_period` and the second as
/// `current_period`, whatever window the caller considers recent.
pub fn compare_halves(orders: &[NormalizedOrder]) -> PeriodMetrics {
    let mut sorted: Vec<&NormalizedOrder> = orders.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let (first, second) = sorted.split_at(sorted.len() / 2);
    compare(HalfTotals::from_orders(first), HalfTotals::from_orders(second))
}

/// Builds the rounded comparison of two halves. Growth is zero whenever the
/// previous value is zero, including when the current value is not.
pub fn compare(previous: HalfTotals, current: HalfTotals) -> PeriodMetrics {
    let previous_orders = Decimal::from(previous.orders);
    let current_orders = Decimal::from(current.orders);

    PeriodMetrics {
        previous_period: half_metrics(&previous),
        current_period: half_metrics(&current),
        growth: GrowthRates {
            orders: round_money(growth_pct(previous_orders, current_orders)),
            revenue: round_money(growth_pct(previous.revenue, current.revenue)),
            avg_order_value: round_money(growth_pct(
                previous.avg_order_value(),
                current.avg_order_value(),
            )),
        },
    }
}

fn half_metrics(totals: &HalfTotals) -> HalfMetrics {
    HalfMetrics {
        orders: totals.orders,
        revenue: round_money(totals.revenue),
        avg_order_value: round_money(totals.avg_order_value()),
    }
}

/// Zero when `previous` is not positive, and also when the ratio does not fit
/// in a `Decimal`.
fn growth_pct(previous: Decimal, current: Decimal) -> Decimal {
    if previous <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{fixtures::*, normalize};
    use core_types::ApprovalStatus::Approved;
    use rust_decimal_macros::dec;

    fn orders(rows: &[(i64, &str, Decimal)]) -> Vec<NormalizedOrder> {
        let raw: Vec<_> = rows
            .iter()
            .map(|(id, date, total)| {
                raw_order(*id, date, true, vec![line(*id, Some(product(1, 1, "A")), *total, 1, Approved)])
            })
            .collect();
        normalize(&raw)
    }

    #[test]
    fn zero_previous_means_zero_growth() {
        let metrics = compare(
            HalfTotals::default(),
            HalfTotals {
                orders: 5,
                revenue: dec!(500),
            },
        );
        assert_eq!(metrics.growth.orders, Decimal::ZERO);
        assert_eq!(metrics.growth.revenue, Decimal::ZERO);
        assert_eq!(metrics.growth.avg_order_value, Decimal::ZERO);
        assert_eq!(metrics.current_period.avg_order_value, dec!(100));
    }

    #[test]
    fn first_half_by_date_is_previous_period() {
        // Supplied out of order on purpose.
        let orders = orders(&[
            (4, "2024-01-04T00:00:00Z", dec!(40)),
            (1, "2024-01-01T00:00:00Z", dec!(10)),
            (3, "2024-01-03T00:00:00Z", dec!(30)),
            (2, "2024-01-02T00:00:00Z", dec!(10)),
            (5, "2024-01-05T00:00:00Z", dec!(20)),
        ]);

        let metrics = compare_halves(&orders);
        assert_eq!(metrics.previous_period.orders, 2);
        assert_eq!(metrics.previous_period.revenue, dec!(20));
        assert_eq!(metrics.current_period.orders, 3);
        assert_eq!(metrics.current_period.revenue, dec!(90));
        assert_eq!(metrics.growth.orders, dec!(50));
        assert_eq!(metrics.growth.revenue, dec!(350));
        assert_eq!(metrics.growth.avg_order_value, dec!(200));
    }

    #[test]
    fn growth_is_rounded_half_up_at_output() {
        let metrics = compare(
            HalfTotals {
                orders: 3,
                revenue: dec!(3),
            },
            HalfTotals {
                orders: 4,
                revenue: dec!(2),
            },
        );
        assert_eq!(metrics.growth.orders, dec!(33.33));
        assert_eq!(metrics.growth.revenue, dec!(-33.33));
        assert_eq!(metrics.current_period.avg_order_value, dec!(0.5));
        assert_eq!(metrics.growth.avg_order_value, dec!(-50));
    }

    #[test]
    fn overflowing_growth_falls_back_to_zero() {
        let metrics = compare(
            HalfTotals {
                orders: 1,
                revenue: Decimal::new(1, 28),
            },
            HalfTotals {
                orders: 1,
                revenue: Decimal::MAX,
            },
        );
        assert_eq!(metrics.growth.revenue, Decimal::ZERO);
        assert_eq!(metrics.growth.orders, Decimal::ZERO);
    }

    #[test]
    fn empty_and_single_order_inputs() {
        assert_eq!(compare_halves(&[]), PeriodMetrics::default());

        let single = orders(&[(1, "2024-01-01T00:00:00Z", dec!(10))]);
        let metrics = compare_halves(&single);
        assert_eq!(metrics.previous_period.orders, 0);
        assert_eq!(metrics.current_period.orders, 1);
        assert_eq!(metrics.growth, GrowthRates::default());
    }
}
