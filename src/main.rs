mod render;

use analytics::{AnalyticsEngine, DateRange, end_of_day, start_of_day};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, ConfigOverrides, OutputFormat, init_tracing, load_config};
use core_types::{Granularity, ReportScope};
use serde::Serialize;
use snapshot::SnapshotRepository;

/// The main entry point for the Tally reporting tool.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.overrides.config)
        .with_context(|| format!("failed to load {}", cli.overrides.config.display()))?;
    cli.overrides.apply(&mut config);

    // The guard flushes the rolling log file on drop, so it lives until main returns.
    let _log_guard = init_tracing(&config.logging).context("failed to initialise logging")?;

    let repository = snapshot::load(&config.snapshot.path)
        .with_context(|| format!("failed to load snapshot {}", config.snapshot.path.display()))?;
    let engine = AnalyticsEngine::new();

    // Execute the appropriate command
    match cli.command {
        Commands::Orders(args) => handle_orders(args, &config, &repository, &engine),
        Commands::Seller(args) => handle_seller(args, &config, &repository, &engine),
        Commands::Inventory(args) => handle_inventory(args, &config, &repository, &engine),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Commerce analytics reports over an exported order snapshot.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order analytics across the whole marketplace.
    Orders(OrdersArgs),
    /// Dashboard for a single seller.
    Seller(SellerArgs),
    /// Day-by-day stock of a single product.
    Inventory(InventoryArgs),
}

#[derive(Args)]
struct WindowArgs {
    /// First day of the report (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the report, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Parser)]
struct OrdersArgs {
    /// Bucket granularity: weekly, monthly, annually or default.
    /// Falls back to `reports.default_granularity`.
    #[arg(long)]
    period: Option<Granularity>,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Parser)]
struct SellerArgs {
    /// The seller to report on.
    #[arg(long)]
    seller_id: i64,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Parser)]
struct InventoryArgs {
    /// The product to replay.
    #[arg(long)]
    product_id: i64,

    #[command(flatten)]
    window: WindowArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_orders(
    args: OrdersArgs,
    config: &Config,
    repository: &SnapshotRepository,
    engine: &AnalyticsEngine,
) -> anyhow::Result<()> {
    let granularity = args.period.unwrap_or(config.reports.default_granularity);
    let range = resolve_window(engine, granularity, &args.window)?;

    let raw_orders = repository.orders_for_scope(ReportScope::Admin, range.start, range.end);
    let report = engine
        .order_analytics(&raw_orders, granularity, range)
        .context("failed to build order analytics")?;

    emit(config.reports.output, &report, render::order_analytics)
}

fn handle_seller(
    args: SellerArgs,
    config: &Config,
    repository: &SnapshotRepository,
    engine: &AnalyticsEngine,
) -> anyhow::Result<()> {
    let seller = repository.seller(args.seller_id)?;
    let range = resolve_window(engine, Granularity::Default, &args.window)?;

    let raw_orders = repository.orders_for_scope(ReportScope::Seller(seller.id), range.start, range.end);
    let dashboard = engine.seller_dashboard(&raw_orders, range);

    emit(config.reports.output, &dashboard, |d| render::seller_dashboard(&seller.name, d))
}

fn handle_inventory(
    args: InventoryArgs,
    config: &Config,
    repository: &SnapshotRepository,
    engine: &AnalyticsEngine,
) -> anyhow::Result<()> {
    let product = repository.product(args.product_id)?;
    let range = resolve_window(engine, Granularity::Default, &args.window)?;

    let history = repository.product_order_history(product.id);
    let detail = engine.inventory_detail(&product, &history, range);

    emit(config.reports.output, &detail, render::inventory_detail)
}

/// Turns the optional `--from`/`--to` days into a full window, filling the
/// open ends from the granularity's default range.
fn resolve_window(
    engine: &AnalyticsEngine,
    granularity: Granularity,
    window: &WindowArgs,
) -> anyhow::Result<DateRange> {
    let start = window.from.map(start_of_day);
    let end = window.to.map(end_of_day).transpose()?;

    let range = engine.periods().resolve_range(granularity, start, end)?;
    if range.start > range.end {
        tracing::warn!(start = %range.start, end = %range.end, "Report window is inverted; it will be empty.");
    }
    Ok(range)
}

fn emit<T: Serialize>(
    format: OutputFormat,
    report: &T,
    table: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Table => println!("{}", table(report)),
    }
    Ok(())
}
