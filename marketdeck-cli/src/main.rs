//! MarketDeck CLI — crypto, commodities overview, and daily quotes screens.
//!
//! Commands:
//! - `crypto` — major-coin cards, active-coin chart, market mood, exchange markets
//! - `overview` — commodity futures panels with per-asset KPIs
//! - `quotes` — daily quote snapshots for a watchlist
//!
//! Degraded sources never fail the process: pages render their "no data"
//! states and warnings, and the exit code stays 0.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use marketdeck_core::catalog::{self, AssetClass, MAJOR_COINS};
use marketdeck_core::config::DeckConfig;
use marketdeck_core::dashboard::{AssetPanel, ChartMetric, Dashboard};
use marketdeck_core::domain::TimeRange;
use marketdeck_core::session::SessionState;

#[derive(Parser)]
#[command(
    name = "marketdeck",
    about = "MarketDeck CLI — market data dashboard in the terminal"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commodity futures overview with per-asset KPI panels.
    Overview {
        /// Asset class: livestock or metal.
        #[arg(long, default_value = "livestock")]
        class: AssetClass,

        /// Assets to include (e.g. Cattle,Sheep). Defaults to the whole class.
        #[arg(long, value_delimiter = ',')]
        assets: Vec<String>,

        /// Time range: 1D, 1W, 1M, 3M, 6M, 1Y.
        #[arg(long, default_value = "1Y")]
        range: TimeRange,
    },
    /// Crypto screen: coin cards, chart, market mood, and exchange markets.
    Crypto {
        /// Active coin id (bitcoin, ethereum, binancecoin, solana, ripple).
        #[arg(long, default_value = "bitcoin")]
        coin: String,

        /// Time range: 1D, 1W, 1M, 3M, 6M, 1Y.
        #[arg(long, default_value = "1W")]
        range: TimeRange,

        /// Chart metric: price or market-cap.
        #[arg(long, default_value = "price")]
        metric: ChartMetric,
    },
    /// Daily quote snapshots for a watchlist.
    Quotes {
        /// Symbols (e.g. BTC-USD,AAPL). Defaults to the built-in watchlist.
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Time range: 1D, 1W, 1M, 3M, 6M, 1Y.
        #[arg(long, default_value = "1M")]
        range: TimeRange,
    },
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let dashboard = Dashboard::new(config);

    match cli.command {
        Commands::Overview {
            class,
            assets,
            range,
        } => run_overview(&dashboard, class, assets, range),
        Commands::Crypto { coin, range, metric } => run_crypto(&dashboard, &coin, range, metric),
        Commands::Quotes { symbols, range } => run_quotes(&dashboard, symbols, range),
    }
}

/// Logs go to stderr so tables on stdout stay pipeable. RUST_LOG overrides
/// the default warn level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DeckConfig> {
    Ok(match path {
        Some(path) => DeckConfig::from_file(path)?,
        None => DeckConfig::load_default(),
    })
}

fn run_overview(
    dashboard: &Dashboard,
    class: AssetClass,
    assets: Vec<String>,
    range: TimeRange,
) -> Result<()> {
    // Validate up front so a typo fails loudly instead of vanishing from the page.
    for name in &assets {
        if catalog::find_asset(class, name).is_none() {
            let valid: Vec<&str> = catalog::assets_for(class).iter().map(|a| a.name).collect();
            bail!("unknown {class} asset '{name}'. Valid: {}", valid.join(", "));
        }
    }

    let page = dashboard.overview_page(class, &assets, range);

    println!();
    println!("=== Commodities Overview: {class} ({range}) ===");
    for panel in &page.panels {
        print_asset_panel(panel);
    }
    println!();
    Ok(())
}

fn print_asset_panel(panel: &AssetPanel) {
    println!();
    println!("--- {} ---", panel.label);
    if panel.series.is_empty() {
        println!("No data available.");
        return;
    }
    if let (Some(first), Some(last)) = (panel.series.first_date(), panel.series.last_date()) {
        println!("Period:         {first} to {last} ({} bars)", panel.series.len());
    }
    println!("Last Close:     {}", fmt_num(panel.series.last_close()));
    println!("Highest Value:  {}", fmt_num(panel.kpis.highest_value));
    println!("Lowest Value:   {}", fmt_num(panel.kpis.lowest_value));
    println!("Highest Close:  {}", fmt_num(panel.kpis.highest_close));
    println!("Lowest Close:   {}", fmt_num(panel.kpis.lowest_close));
    println!("Avg Day Range:  {}", fmt_num(nan_mean(&panel.volatility)));
}

fn run_crypto(dashboard: &Dashboard, coin: &str, range: TimeRange, metric: ChartMetric) -> Result<()> {
    let mut session = SessionState::new();
    if !session.select_coin(coin) {
        let valid: Vec<&str> = MAJOR_COINS.iter().map(|c| c.id).collect();
        bail!("unknown coin '{coin}'. Valid: {}", valid.join(", "));
    }

    let page = dashboard.crypto_page(&session, range);
    let active = session.active_coin();

    println!();
    println!("=== Crypto Markets ({range}) ===");
    println!();
    println!(
        "{:<6} {:<12} {:>14} {:>9}  {:<16}",
        "Coin", "Name", "Price", "24h %", "7d"
    );
    println!("{}", "-".repeat(62));
    for card in &page.cards {
        let spark = if card.plottable {
            render_sparkline(&card.sparkline, 16)
        } else {
            "-".to_string()
        };
        println!(
            "{:<6} {:<12} {:>14} {:>9}  {:<16}",
            card.coin.ticker,
            card.coin.name,
            fmt_num(card.price),
            fmt_num(card.change_pct_24h),
            spark
        );
    }

    println!();
    println!("--- {} Chart ({metric}, {range}) ---", active.name);
    let points = page.chart_points(metric);
    if points.is_empty() {
        println!("No data available.");
    } else {
        let first = points[0];
        let last = points[points.len() - 1];
        println!("Period:         {} to {} ({} points)", first.0, last.0, points.len());
        println!("Start:          {}", fmt_num(first.1));
        println!("End:            {}", fmt_num(last.1));
        println!(
            "Trend:          {}",
            if page.chart_trend_up { "up" } else { "down" }
        );
    }

    println!();
    println!("--- Market Mood ---");
    let mood = if page.sentiment.classification.is_empty() {
        fmt_num(page.sentiment.value)
    } else {
        format!("{} ({})", fmt_num(page.sentiment.value), page.sentiment.classification)
    };
    println!("Fear & Greed:   {mood}");
    println!("BTC Dominance:  {}%", fmt_num(page.btc_dominance));
    println!("Altcoin Season: {}", fmt_num(page.altcoin_season));

    println!();
    println!("--- {} Markets ---", active.name);
    if page.markets.is_empty() {
        println!("No data available.");
    } else {
        println!(
            "{:<16} {:<12} {:>14} {:>16} {:>5} {:>8}",
            "Exchange", "Pair", "Price", "24h Volume", "Liq", "Share %"
        );
        println!("{}", "-".repeat(76));
        for row in &page.markets {
            println!(
                "{:<16} {:<12} {:>14} {:>16} {:>5} {:>8}",
                row.exchange,
                row.pair,
                fmt_num(row.price),
                fmt_num(row.volume_24h),
                fmt_num(row.liquidity_score),
                fmt_num(row.volume_share_pct)
            );
        }
    }

    println!();
    Ok(())
}

fn run_quotes(dashboard: &Dashboard, symbols: Vec<String>, range: TimeRange) -> Result<()> {
    let page = dashboard.quotes_page(&symbols, range);

    println!();
    println!("=== Daily Quotes ({range}) ===");
    println!();
    println!(
        "{:<10} {:>14} {:>9} {:>6}",
        "Symbol", "Price", "Change %", "Bars"
    );
    println!("{}", "-".repeat(42));
    for row in &page.rows {
        println!(
            "{:<10} {:>14} {:>9} {:>6}",
            row.symbol,
            fmt_num(row.current_price),
            fmt_num(row.percent_change),
            row.series.len()
        );
    }

    for warning in &page.warnings {
        println!("WARNING: {warning}");
    }

    println!();
    Ok(())
}

/// NaN renders as a dash, everything else with two decimals.
fn fmt_num(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Block-glyph sparkline, downsampled to at most `width` columns.
fn render_sparkline(values: &[f64], width: usize) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 || width == 0 {
        return "-".to_string();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };

    let cols = width.min(finite.len());
    (0..cols)
        .map(|col| {
            let idx = col * (finite.len() - 1) / (cols - 1).max(1);
            let norm = (finite[idx] - min) / span;
            let level = ((norm * 7.0).round() as usize).min(7);
            SPARK_GLYPHS[level]
        })
        .collect()
}
