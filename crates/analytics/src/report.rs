use crate::aggregate::PeriodReport;
use crate::growth::PeriodMetrics;
use crate::inventory::InventoryPoint;
use crate::period::DateRange;
use analyzer::RankedEntity;
use chrono::{DateTime, Utc};
use core_types::Granularity;
use rust_decimal::Decimal;
use serde::Serialize;

/// Headline figures of the order analytics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub total_items_sold: u64,
    pub unique_products: usize,
    pub unique_buyers: usize,
    pub unique_sellers: usize,
}

impl Overview {
    /// Creates a new, zeroed-out Overview.
    pub fn new() -> Self {
        Self {
            total_orders: 0,
            total_revenue: Decimal::ZERO,
            average_order_value: Decimal::ZERO,
            total_items_sold: 0,
            unique_products: 0,
            unique_buyers: 0,
            unique_sellers: 0,
        }
    }
}

impl Default for Overview {
    fn default() -> Self {
        Self::new()
    }
}

/// One point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Calendar key of the bucket ("2024-01-05" or "2024-01").
    pub period: String,
    pub label: String,
    pub value: Decimal,
    /// Start of the bucket.
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub order_data: Vec<SeriesPoint>,
    pub revenue_data: Vec<SeriesPoint>,
    pub avg_order_value_data: Vec<SeriesPoint>,
}

impl AnalyticsData {
    /// Splits per-bucket reports into the three chart series.
    pub fn from_periods(periods: &[PeriodReport]) -> Self {
        let point = |p: &PeriodReport, value: Decimal| SeriesPoint {
            period: p.bucket.key.clone(),
            label: p.bucket.label.clone(),
            value,
            date: p.bucket.start,
        };

        Self {
            order_data: periods
                .iter()
                .map(|p| point(p, Decimal::from(p.order_count)))
                .collect(),
            revenue_data: periods.iter().map(|p| point(p, p.revenue)).collect(),
            avg_order_value_data: periods
                .iter()
                .map(|p| point(p, p.average_order_value))
                .collect(),
        }
    }
}

/// The admin order analytics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalyticsReport {
    pub period: Granularity,
    pub date_range: DateRange,
    pub overview: Overview,
    pub analytics_data: AnalyticsData,
    pub period_metrics: PeriodMetrics,
    pub top_products: Vec<RankedEntity<i64>>,
    pub top_sellers: Vec<RankedEntity<i64>>,
    pub category_breakdown: Vec<RankedEntity<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub buyer_id: i64,
    pub total: Decimal,
    pub item_count: usize,
}

/// Sales on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySales {
    /// "Sun" through "Sat".
    pub day: String,
    pub orders: usize,
    pub revenue: Decimal,
}

/// The seller dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerDashboard {
    pub average_order_value: Decimal,
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<RecentOrder>,
    pub top_selling_products: Vec<RankedEntity<i64>>,
    /// Always seven entries, Sunday first.
    pub sales_data: Vec<WeekdaySales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProduct {
    pub id: i64,
    pub title: String,
    pub initial_stock: i64,
    pub current_stock: i64,
    pub created_at: DateTime<Utc>,
}

/// Inventory detail for a single product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetail {
    pub product: InventoryProduct,
    pub inventory_data: Vec<InventoryPoint>,
}
