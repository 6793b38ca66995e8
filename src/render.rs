//! Plain-text tables for `--format table`.

use analytics::{InventoryDetail, OrderAnalyticsReport, SellerDashboard};
use analyzer::RankedEntity;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::fmt::Display;

pub fn order_analytics(report: &OrderAnalyticsReport) -> String {
    let overview = &report.overview;
    let mut summary = new_table(vec!["Metric", "Value"]);
    summary
        .add_row(vec!["Period".to_string(), report.period.to_string()])
        .add_row(vec![
            "Window".to_string(),
            format!("{} .. {}", report.date_range.start, report.date_range.end),
        ])
        .add_row(vec!["Orders".to_string(), overview.total_orders.to_string()])
        .add_row(vec!["Revenue".to_string(), overview.total_revenue.to_string()])
        .add_row(vec![
            "Avg order value".to_string(),
            overview.average_order_value.to_string(),
        ])
        .add_row(vec!["Items sold".to_string(), overview.total_items_sold.to_string()])
        .add_row(vec!["Products".to_string(), overview.unique_products.to_string()])
        .add_row(vec!["Buyers".to_string(), overview.unique_buyers.to_string()])
        .add_row(vec!["Sellers".to_string(), overview.unique_sellers.to_string()]);

    let bucket_header = if report.period.is_monthly_buckets() { "Month" } else { "Day" };
    let mut series = new_table(vec![bucket_header, "Orders", "Revenue", "Avg order value"]);
    let data = &report.analytics_data;
    for ((orders, revenue), aov) in data
        .order_data
        .iter()
        .zip(&data.revenue_data)
        .zip(&data.avg_order_value_data)
    {
        series.add_row(vec![
            orders.label.clone(),
            orders.value.to_string(),
            revenue.value.to_string(),
            aov.value.to_string(),
        ]);
    }

    let metrics = &report.period_metrics;
    let mut growth = new_table(vec!["", "Previous", "Current", "Growth %"]);
    growth
        .add_row(vec![
            "Orders".to_string(),
            metrics.previous_period.orders.to_string(),
            metrics.current_period.orders.to_string(),
            metrics.growth.orders.to_string(),
        ])
        .add_row(vec![
            "Revenue".to_string(),
            metrics.previous_period.revenue.to_string(),
            metrics.current_period.revenue.to_string(),
            metrics.growth.revenue.to_string(),
        ])
        .add_row(vec![
            "Avg order value".to_string(),
            metrics.previous_period.avg_order_value.to_string(),
            metrics.current_period.avg_order_value.to_string(),
            metrics.growth.avg_order_value.to_string(),
        ]);

    [
        summary.to_string(),
        series.to_string(),
        growth.to_string(),
        section("Top products", &report.top_products),
        section("Top sellers", &report.top_sellers),
        section("Categories", &report.category_breakdown),
    ]
    .join("\n\n")
}

pub fn seller_dashboard(seller_name: &str, dashboard: &SellerDashboard) -> String {
    let mut summary = new_table(vec!["Seller", "Orders", "Revenue", "Avg order value"]);
    summary.add_row(vec![
        seller_name.to_string(),
        dashboard.total_orders.to_string(),
        dashboard.total_revenue.to_string(),
        dashboard.average_order_value.to_string(),
    ]);

    let mut recent = new_table(vec!["Order", "Date", "Buyer", "Items", "Total"]);
    for order in &dashboard.recent_orders {
        recent.add_row(vec![
            order.id.to_string(),
            order.date.format("%Y-%m-%d %H:%M").to_string(),
            order.buyer_id.to_string(),
            order.item_count.to_string(),
            order.total.to_string(),
        ]);
    }

    let mut weekdays = new_table(vec!["Day", "Orders", "Revenue"]);
    for day in &dashboard.sales_data {
        weekdays.add_row(vec![day.day.clone(), day.orders.to_string(), day.revenue.to_string()]);
    }

    [
        summary.to_string(),
        recent.to_string(),
        section("Top selling products", &dashboard.top_selling_products),
        weekdays.to_string(),
    ]
    .join("\n\n")
}

pub fn inventory_detail(detail: &InventoryDetail) -> String {
    let product = &detail.product;
    let mut summary = new_table(vec!["Product", "Title", "Initial stock", "Current stock", "Created"]);
    summary.add_row(vec![
        product.id.to_string(),
        product.title.clone(),
        product.initial_stock.to_string(),
        product.current_stock.to_string(),
        product.created_at.format("%Y-%m-%d").to_string(),
    ]);

    let mut days = new_table(vec!["Date", "Stock", "Sold"]);
    for point in &detail.inventory_data {
        days.add_row(vec![point.date.to_string(), point.stock.to_string(), point.sold.to_string()]);
    }

    format!("{summary}\n\n{days}")
}

fn section<K: Display>(title: &str, rows: &[RankedEntity<K>]) -> String {
    let mut table = new_table(vec!["#", "Id", "Name", "Quantity", "Revenue", "Orders"]);
    for (rank, row) in rows.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            row.id.to_string(),
            row.name.clone(),
            row.total_quantity.to_string(),
            row.total_revenue.to_string(),
            row.order_count.to_string(),
        ]);
    }
    format!("{title}\n{table}")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}
