use crate::aggregate::{aggregate, aggregate_cancellable, CancelFlag, PeriodReport};
use crate::error::AnalyticsError;
use crate::growth::compare_halves;
use crate::inventory::InventoryReconstructor;
use crate::normalize::normalize;
use crate::period::{DateRange, PeriodGenerator};
use crate::report::{
    AnalyticsData, InventoryDetail, InventoryProduct, OrderAnalyticsReport, Overview, RecentOrder,
    SellerDashboard, WeekdaySales,
};
use analyzer::{
    RankingEngine, DASHBOARD_TOP_PRODUCTS_LIMIT, TOP_PRODUCTS_LIMIT, TOP_SELLERS_LIMIT,
};
use chrono::Datelike;
use core_types::{
    round_money, safe_div, Clock, Granularity, NormalizedOrder, Product, RawOrder, SystemClock,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Number of orders listed on a seller's dashboard.
pub const RECENT_ORDERS_LIMIT: usize = 10;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Builds every report from raw, already-scoped order data.
///
/// The engine keeps no state between calls beyond its clock, so a single
/// instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    periods: PeriodGenerator,
    ranking: RankingEngine,
    inventory: InventoryReconstructor,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            periods: PeriodGenerator::new(clock.clone()),
            ranking: RankingEngine::new(),
            inventory: InventoryReconstructor::new(clock),
        }
    }

    /// The period generator, for resolving open-ended date ranges.
    pub fn periods(&self) -> &PeriodGenerator {
        &self.periods
    }

    /// The admin order analytics report.
    ///
    /// # Arguments
    ///
    /// * `raw_orders` - Orders for the report's scope, with projections joined.
    /// * `granularity` - Bucket granularity of the time series.
    /// * `range` - The report window. Orders dated outside it are ignored.
    pub fn order_analytics(
        &self,
        raw_orders: &[RawOrder],
        granularity: Granularity,
        range: DateRange,
    ) -> Result<OrderAnalyticsReport, AnalyticsError> {
        let buckets = self.periods.generate(range.start, range.end, granularity)?;
        let orders = normalize_in_range(raw_orders, range);
        let periods = aggregate(&orders, &buckets);
        self.build_order_report(&orders, periods, granularity, range, None)
    }

    /// Same as [`AnalyticsEngine::order_analytics`], but stops with
    /// [`AnalyticsError::Cancelled`] once `cancel` is raised.
    pub fn order_analytics_cancellable(
        &self,
        raw_orders: &[RawOrder],
        granularity: Granularity,
        range: DateRange,
        cancel: &CancelFlag,
    ) -> Result<OrderAnalyticsReport, AnalyticsError> {
        let buckets = self.periods.generate(range.start, range.end, granularity)?;
        cancel.checkpoint()?;
        let orders = normalize_in_range(raw_orders, range);
        let periods = aggregate_cancellable(&orders, &buckets, cancel)?;
        self.build_order_report(&orders, periods, granularity, range, Some(cancel))
    }

    /// Assembles the report from aggregated periods. With a `cancel` flag,
    /// checks it before the growth comparison and before the rankings.
    fn build_order_report(
        &self,
        orders: &[NormalizedOrder],
        periods: Vec<PeriodReport>,
        granularity: Granularity,
        range: DateRange,
        cancel: Option<&CancelFlag>,
    ) -> Result<OrderAnalyticsReport, AnalyticsError> {
        let checkpoint = || cancel.map_or(Ok(()), CancelFlag::checkpoint);

        let overview = overview(orders);
        tracing::debug!(orders = overview.total_orders, buckets = periods.len(), "Aggregated periods.");

        checkpoint()?;
        let period_metrics = compare_halves(orders);
        tracing::debug!(growth = ?period_metrics.growth, "Compared halves.");

        checkpoint()?;
        let report = OrderAnalyticsReport {
            period: granularity,
            date_range: range,
            overview,
            analytics_data: AnalyticsData::from_periods(&periods),
            period_metrics,
            top_products: self.ranking.top_products(orders, TOP_PRODUCTS_LIMIT),
            top_sellers: self.ranking.top_sellers(orders, TOP_SELLERS_LIMIT),
            category_breakdown: self.ranking.category_breakdown(orders),
        };

        tracing::info!(
            %granularity,
            start = %range.start,
            end = %range.end,
            orders = report.overview.total_orders,
            revenue = %report.overview.total_revenue,
            "Built order analytics report."
        );
        Ok(report)
    }

    /// The dashboard of a single seller. `raw_orders` must already be limited
    /// to the seller's products.
    pub fn seller_dashboard(&self, raw_orders: &[RawOrder], range: DateRange) -> SellerDashboard {
        let orders = normalize_in_range(raw_orders, range);
        let total_revenue: Decimal = orders.iter().map(|o| o.approved_total).sum();

        let mut recent: Vec<&NormalizedOrder> = orders.iter().collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        let recent_orders = recent
            .into_iter()
            .take(RECENT_ORDERS_LIMIT)
            .map(|o| RecentOrder {
                id: o.id,
                date: o.date,
                buyer_id: o.buyer_id,
                total: round_money(o.approved_total),
                item_count: o.items.len(),
            })
            .collect();

        let mut by_weekday = [(0usize, Decimal::ZERO); 7];
        for order in &orders {
            let slot = &mut by_weekday[order.date.weekday().num_days_from_sunday() as usize];
            slot.0 += 1;
            slot.1 += order.approved_total;
        }
        let sales_data = WEEKDAYS
            .iter()
            .zip(by_weekday)
            .map(|(day, (orders, revenue))| WeekdaySales {
                day: (*day).to_string(),
                orders,
                revenue: round_money(revenue),
            })
            .collect();

        let dashboard = SellerDashboard {
            average_order_value: round_money(safe_div(total_revenue, Decimal::from(orders.len()))),
            total_orders: orders.len(),
            total_revenue: round_money(total_revenue),
            recent_orders,
            top_selling_products: self
                .ranking
                .top_products(&orders, DASHBOARD_TOP_PRODUCTS_LIMIT),
            sales_data,
        };

        tracing::info!(
            orders = dashboard.total_orders,
            revenue = %dashboard.total_revenue,
            "Built seller dashboard."
        );
        dashboard
    }

    /// Day-by-day stock and sales of one product over `range`.
    ///
    /// `history` is every order carrying the product, regardless of date.
    pub fn inventory_detail(
        &self,
        product: &Product,
        history: &[RawOrder],
        range: DateRange,
    ) -> InventoryDetail {
        let series = self
            .inventory
            .reconstruct(product, history, range.start, range.end);

        tracing::info!(
            product_id = product.id,
            days = series.series.len(),
            current_stock = series.current_stock,
            "Built inventory detail."
        );

        InventoryDetail {
            product: InventoryProduct {
                id: product.id,
                title: product.title.clone(),
                initial_stock: product.stock_quantity,
                current_stock: series.current_stock,
                created_at: product.created_at,
            },
            inventory_data: series.series,
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_in_range(raw_orders: &[RawOrder], range: DateRange) -> Vec<NormalizedOrder> {
    let mut orders = normalize(raw_orders);
    orders.retain(|o| o.date >= range.start && o.date <= range.end);
    orders
}

fn overview(orders: &[NormalizedOrder]) -> Overview {
    if orders.is_empty() {
        return Overview::new();
    }

    let total_revenue: Decimal = orders.iter().map(|o| o.approved_total).sum();
    let items = || orders.iter().flat_map(|o| o.items.iter());

    Overview {
        total_orders: orders.len(),
        total_revenue: round_money(total_revenue),
        average_order_value: round_money(safe_div(total_revenue, Decimal::from(orders.len()))),
        total_items_sold: orders.iter().map(NormalizedOrder::items_sold).sum(),
        unique_products: items().map(|i| i.product_id).collect::<BTreeSet<_>>().len(),
        unique_buyers: orders.iter().map(|o| o.buyer_id).collect::<BTreeSet<_>>().len(),
        // Sellers that failed to resolve are not counted.
        unique_sellers: items()
            .filter(|i| i.seller_name.is_some())
            .map(|i| i.seller_id)
            .collect::<BTreeSet<_>>()
            .len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::PeriodMetrics;
    use crate::normalize::fixtures::*;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::ApprovalStatus::Approved;
    use core_types::FixedClock;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::with_clock(Arc::new(FixedClock(at(2024, 3, 20))))
    }

    fn week() -> DateRange {
        DateRange {
            start: at(2024, 3, 4),
            end: Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap(),
        }
    }

    /// Monday 4 March 2024 through Thursday 7 March, one unpaid order.
    fn raw_orders() -> Vec<RawOrder> {
        let books = product(1, 1, "Books");
        let toys = product(2, 2, "Toys");
        vec![
            raw_order(
                1,
                "2024-03-04T10:00:00Z",
                true,
                vec![
                    line(1, Some(books.clone()), dec!(10), 2, Approved),
                    line(2, Some(toys.clone()), dec!(5), 1, Approved),
                ],
            ),
            raw_order(2, "2024-03-05T10:00:00Z", true, vec![line(3, Some(books), dec!(10), 1, Approved)]),
            raw_order(
                3,
                "2024-03-06T10:00:00Z",
                false,
                vec![line(4, Some(product(3, 3, "Garden")), dec!(99), 1, Approved)],
            ),
            raw_order(4, "2024-03-07T10:00:00Z", true, vec![line(5, Some(toys), dec!(5), 3, Approved)]),
        ]
    }

    #[test]
    fn order_analytics_builds_every_section() {
        let report = engine()
            .order_analytics(&raw_orders(), Granularity::Weekly, week())
            .unwrap();

        let overview = &report.overview;
        assert_eq!(overview.total_orders, 3);
        assert_eq!(overview.total_revenue, dec!(50));
        assert_eq!(overview.average_order_value, dec!(16.67));
        assert_eq!(overview.total_items_sold, 7);
        assert_eq!(overview.unique_products, 2);
        assert_eq!(overview.unique_buyers, 2);
        assert_eq!(overview.unique_sellers, 2);

        let data = &report.analytics_data;
        assert_eq!(data.order_data.len(), 7);
        assert_eq!(data.order_data[0].value, dec!(1));
        assert_eq!(data.order_data[0].period, "2024-03-04");
        assert_eq!(data.order_data[2].value, Decimal::ZERO);
        assert_eq!(data.revenue_data[0].value, dec!(25));
        assert_eq!(data.avg_order_value_data[3].value, dec!(15));

        let growth = &report.period_metrics.growth;
        assert_eq!(report.period_metrics.previous_period.orders, 1);
        assert_eq!(growth.orders, dec!(100));
        assert_eq!(growth.revenue, Decimal::ZERO);
        assert_eq!(growth.avg_order_value, dec!(-50));

        assert_eq!(report.top_products[0].id, 1);
        assert_eq!(report.top_products[0].total_revenue, dec!(30));
        assert_eq!(report.top_products[0].order_count, 2);
        assert_eq!(report.top_sellers.len(), 2);
        assert_eq!(report.category_breakdown[1].id, "Toys");
    }

    #[test]
    fn empty_input_yields_zeroed_report() {
        let report = engine().order_analytics(&[], Granularity::Weekly, week()).unwrap();

        assert_eq!(report.overview, Overview::default());
        assert!(report.analytics_data.revenue_data.iter().all(|p| p.value.is_zero()));
        assert_eq!(report.analytics_data.revenue_data.len(), 7);
        assert_eq!(report.period_metrics, PeriodMetrics::default());
        assert!(report.top_products.is_empty());
        assert!(report.category_breakdown.is_empty());
    }

    #[test]
    fn orders_outside_the_range_are_ignored() {
        let range = DateRange {
            start: at(2024, 3, 5),
            end: Utc.with_ymd_and_hms(2024, 3, 6, 23, 59, 59).unwrap(),
        };
        let report = engine()
            .order_analytics(&raw_orders(), Granularity::Default, range)
            .unwrap();

        assert_eq!(report.overview.total_orders, 1);
        assert_eq!(report.analytics_data.order_data.len(), 2);
    }

    #[test]
    fn cancelled_report_returns_error() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let result =
            engine().order_analytics_cancellable(&raw_orders(), Granularity::Weekly, week(), &cancel);
        assert_eq!(result.unwrap_err(), AnalyticsError::Cancelled);
    }

    #[test]
    fn cancellation_is_seen_after_aggregation() {
        let raw = raw_orders();
        // Weekly: one engine checkpoint, then aggregation's one plus seven per bucket.
        let through_aggregation = 1 + 1 + 7;

        for passing in [through_aggregation, through_aggregation + 1] {
            let cancel = CancelFlag::tripping_after(passing);
            let result = engine().order_analytics_cancellable(&raw, Granularity::Weekly, week(), &cancel);
            assert_eq!(result.unwrap_err(), AnalyticsError::Cancelled, "{passing} checkpoints");
        }

        let cancel = CancelFlag::tripping_after(through_aggregation + 2);
        let report = engine()
            .order_analytics_cancellable(&raw, Granularity::Weekly, week(), &cancel)
            .unwrap();
        assert_eq!(
            report,
            engine().order_analytics(&raw, Granularity::Weekly, week()).unwrap()
        );
    }

    #[test]
    fn report_serializes_in_camel_case() {
        let report = engine()
            .order_analytics(&raw_orders(), Granularity::Monthly, week())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["period"], "monthly");
        assert!(json["overview"].get("uniqueBuyers").is_some());
        assert!(json["analyticsData"].get("avgOrderValueData").is_some());
        assert!(json["periodMetrics"].get("previousPeriod").is_some());
    }

    #[test]
    fn seller_dashboard_groups_by_weekday() {
        let dashboard = engine().seller_dashboard(&raw_orders(), week());

        assert_eq!(dashboard.total_orders, 3);
        assert_eq!(dashboard.total_revenue, dec!(50));
        assert_eq!(dashboard.average_order_value, dec!(16.67));
        assert_eq!(
            dashboard.recent_orders.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![4, 2, 1]
        );
        assert_eq!(dashboard.recent_orders[2].item_count, 2);
        assert_eq!(dashboard.top_selling_products.len(), 2);

        let days: Vec<_> = dashboard
            .sales_data
            .iter()
            .map(|d| (d.day.as_str(), d.orders, d.revenue))
            .collect();
        assert_eq!(
            days,
            vec![
                ("Sun", 0, dec!(0)),
                ("Mon", 1, dec!(25)),
                ("Tue", 1, dec!(10)),
                ("Wed", 0, dec!(0)),
                ("Thu", 1, dec!(15)),
                ("Fri", 0, dec!(0)),
                ("Sat", 0, dec!(0)),
            ]
        );
    }

    #[test]
    fn seller_dashboard_without_orders_still_has_seven_days() {
        let dashboard = engine().seller_dashboard(&[], week());
        assert_eq!(dashboard.sales_data.len(), 7);
        assert_eq!(dashboard.average_order_value, Decimal::ZERO);
        assert!(dashboard.recent_orders.is_empty());
    }

    #[test]
    fn inventory_detail_reports_initial_and_current_stock() {
        let mut lamp = product(9, 1, "Lighting");
        lamp.stock_quantity = 20;
        let history = vec![raw_order(
            1,
            "2024-01-02T09:00:00Z",
            true,
            vec![line(1, Some(lamp.clone()), dec!(30), 4, Approved)],
        )];
        let range = DateRange {
            start: at(2024, 1, 1),
            end: at(2024, 1, 3),
        };

        let detail = engine().inventory_detail(&lamp, &history, range);
        assert_eq!(detail.product.initial_stock, 20);
        assert_eq!(detail.product.current_stock, 16);
        assert_eq!(
            detail.inventory_data.iter().map(|p| p.stock).collect::<Vec<_>>(),
            vec![20, 20, 16]
        );
    }
}
