//! # Tally Analytics Engine
//!
//! This crate turns raw order records into the periodic business reports of the
//! system: revenue and order counts per calendar bucket, growth between the two
//! halves of a window, leaderboards, and a day-by-day stock replay for a product.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O. Callers hand in orders already fetched for a scope
//!   and date range, and get a serializable report back. It depends only on
//!   `core-types` and the `analyzer` ranking engine.
//! - **Injected Time:** Anything that needs "now" reads it from a `Clock`, so
//!   every report is reproducible in tests with a `FixedClock`.
//! - **Round Once:** Money is summed unrounded and rounded half-up to two
//!   places only when it is written into a report.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Builds the order analytics report, the seller dashboard and
//!   the inventory detail.
//! - `PeriodGenerator`: Calendar buckets for the weekly, monthly, annual and default granularities.
//! - `normalize`, `aggregate`, `compare_halves`: The individual pipeline stages.
//! - `InventoryReconstructor`: The stock replay.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod engine;
pub mod error;
pub mod growth;
pub mod inventory;
pub mod normalize;
pub mod period;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{aggregate, aggregate_cancellable, CancelFlag, PeriodReport};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use growth::{compare, compare_halves, GrowthRates, HalfMetrics, HalfTotals, PeriodMetrics};
pub use inventory::{InventoryPoint, InventoryReconstructor, InventorySeries};
pub use normalize::normalize;
pub use period::{DateRange, PeriodGenerator, TimeBucket, end_of_day, start_of_day};
pub use report::{
    AnalyticsData, InventoryDetail, InventoryProduct, OrderAnalyticsReport, Overview,
    RecentOrder, SellerDashboard, SeriesPoint, WeekdaySales,
};
