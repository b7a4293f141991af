//! Dashboard pages assembled as plain view-models.
//!
//! Each page method gathers everything one screen needs through the data
//! service (and therefore through the caches) and reduces it with the
//! display metrics. Pages are plain data: the bundled CLI, a future TUI,
//! and tests all render them without touching the network layer. Degraded
//! sources surface as empty series and NaN figures, never as errors.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::catalog::{self, AssetClass, CoinInfo, DEFAULT_QUOTE_SYMBOLS, MAJOR_COINS};
use crate::config::DeckConfig;
use crate::data::{DataService, ExchangeTicker, SentimentReading};
use crate::domain::{CanonicalSeries, TimeRange};
use crate::metrics::{self, Kpis};
use crate::session::SessionState;

/// Which chart series field the crypto price chart plots.
///
/// Market cap rides in the `volume` slot of chart bars (the canonical shape
/// has no dedicated column), so the selector makes the reading explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    Price,
    MarketCap,
}

impl std::fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartMetric::Price => write!(f, "price"),
            ChartMetric::MarketCap => write!(f, "market-cap"),
        }
    }
}

impl std::str::FromStr for ChartMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Ok(ChartMetric::Price),
            "market-cap" | "market_cap" | "marketcap" => Ok(ChartMetric::MarketCap),
            other => Err(format!(
                "unknown chart metric '{other}' (expected price or market-cap)"
            )),
        }
    }
}

/// One major-coin card: catalog identity plus the latest market snapshot.
/// A coin missing from the snapshot payload renders as NaN, not as an error.
#[derive(Debug, Clone)]
pub struct CoinCard {
    pub coin: &'static CoinInfo,
    pub price: f64,
    pub change_pct_24h: f64,
    pub sparkline: Vec<f64>,
    pub plottable: bool,
}

/// One row of the exchange markets table for the active coin.
#[derive(Debug, Clone)]
pub struct MarketRow {
    pub exchange: String,
    pub pair: String,
    pub price: f64,
    pub volume_24h: f64,
    pub liquidity_score: f64,
    pub volume_share_pct: f64,
    pub trade_url: Option<String>,
}

/// The crypto screen: coin cards, the active coin's chart, market mood
/// gauges, and the exchange markets table.
#[derive(Debug, Clone)]
pub struct CryptoPage {
    pub cards: Vec<CoinCard>,
    pub chart: CanonicalSeries,
    pub chart_trend_up: bool,
    pub sentiment: SentimentReading,
    pub btc_dominance: f64,
    pub altcoin_season: f64,
    pub markets: Vec<MarketRow>,
}

impl CryptoPage {
    /// Project the chart onto `(date, value)` pairs for the chosen metric,
    /// dropping NaN rows so plots never draw gaps as zeros.
    pub fn chart_points(&self, metric: ChartMetric) -> Vec<(NaiveDate, f64)> {
        self.chart
            .bars
            .iter()
            .filter_map(|bar| {
                let value = match metric {
                    ChartMetric::Price => bar.close,
                    ChartMetric::MarketCap => bar.volume,
                };
                (!value.is_nan()).then_some((bar.date, value))
            })
            .collect()
    }
}

/// One futures asset on the commodities overview.
#[derive(Debug, Clone)]
pub struct AssetPanel {
    pub label: String,
    pub series: CanonicalSeries,
    pub kpis: Kpis,
    pub volatility: Vec<f64>,
}

/// The commodities overview screen. Panel order follows the selection; the
/// first panel is the primary asset.
#[derive(Debug, Clone)]
pub struct OverviewPage {
    pub panels: Vec<AssetPanel>,
}

impl OverviewPage {
    pub fn primary(&self) -> Option<&AssetPanel> {
        self.panels.first()
    }
}

/// One symbol on the quotes screen: the latest snapshot from the full daily
/// history plus the window-clipped series backing its trend line.
#[derive(Debug, Clone)]
pub struct QuoteRow {
    pub symbol: String,
    pub current_price: f64,
    pub percent_change: f64,
    pub series: CanonicalSeries,
}

/// The daily quotes screen.
#[derive(Debug, Clone)]
pub struct QuotesPage {
    pub rows: Vec<QuoteRow>,
    pub warnings: Vec<String>,
}

/// Assembles pages on demand. Cheap to share: all state lives in the
/// service's caches, so concurrent page builds coalesce on identical keys.
pub struct Dashboard {
    service: DataService,
}

impl Dashboard {
    pub fn new(config: DeckConfig) -> Self {
        Self {
            service: DataService::new(config),
        }
    }

    pub fn with_service(service: DataService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &DataService {
        &self.service
    }

    /// Commodities overview: one panel per selected asset, fetched in
    /// parallel. An empty selection means every asset in the class. Names
    /// not in the catalog are skipped; callers validate before building.
    pub fn overview_page(
        &self,
        class: AssetClass,
        assets: &[String],
        range: TimeRange,
    ) -> OverviewPage {
        let selected: Vec<_> = if assets.is_empty() {
            catalog::assets_for(class).iter().collect()
        } else {
            assets
                .iter()
                .filter_map(|name| catalog::find_asset(class, name))
                .collect()
        };

        let today = chrono::Utc::now().date_naive();
        let start = today - chrono::Duration::days(i64::from(range.days()));

        let panels = selected
            .par_iter()
            .map(|asset| {
                let series = self.service.futures_history(asset.ticker, start, today);
                AssetPanel {
                    label: asset.label(),
                    kpis: metrics::kpis(&series),
                    volatility: metrics::volatility(&series),
                    series,
                }
            })
            .collect();

        OverviewPage { panels }
    }

    /// Crypto screen for the session's active coin.
    pub fn crypto_page(&self, session: &SessionState, range: TimeRange) -> CryptoPage {
        let ids: Vec<&str> = MAJOR_COINS.iter().map(|c| c.id).collect();
        let snapshots = self.service.market_cards(&ids);

        // Cards keep catalog order regardless of response order, and a coin
        // absent from the payload still gets a (NaN) card.
        let cards = MAJOR_COINS
            .iter()
            .map(|coin| match snapshots.iter().find(|s| s.id == coin.id) {
                Some(snap) => CoinCard {
                    coin,
                    price: snap.price,
                    change_pct_24h: snap.change_pct_24h,
                    sparkline: snap.sparkline.clone(),
                    plottable: snap.plottable,
                },
                None => CoinCard {
                    coin,
                    price: f64::NAN,
                    change_pct_24h: f64::NAN,
                    sparkline: Vec::new(),
                    plottable: false,
                },
            })
            .collect();

        let coin = session.active_coin();
        let chart = self.service.coin_chart(coin.id, range.days());
        let chart_trend_up = metrics::trend_is_up(&chart);
        let global = self.service.global_stats();
        let sentiment = self.service.sentiment();
        let markets = market_rows(self.service.exchange_tickers(coin.id));

        CryptoPage {
            cards,
            chart,
            chart_trend_up,
            sentiment,
            btc_dominance: global.btc_dominance,
            altcoin_season: metrics::altcoin_season_approx(global.btc_dominance),
            markets,
        }
    }

    /// Daily quotes screen: one row per symbol, fetched in parallel. The
    /// snapshot figures and the no-data warnings read the full history;
    /// only the trend series is clipped to the window. An empty list falls
    /// back to the default watchlist.
    pub fn quotes_page(&self, symbols: &[String], range: TimeRange) -> QuotesPage {
        let symbols: Vec<String> = if symbols.is_empty() {
            DEFAULT_QUOTE_SYMBOLS.iter().map(|s| s.to_string()).collect()
        } else {
            symbols.to_vec()
        };

        let today = chrono::Utc::now().date_naive();
        let start = today - chrono::Duration::days(i64::from(range.days()));

        let fetched: Vec<CanonicalSeries> = symbols
            .par_iter()
            .map(|symbol| self.service.daily_series(symbol))
            .collect();

        let mut warnings = Vec::new();
        if !self.service.has_quotes_key() {
            warnings.push(
                "Daily quotes API key is not configured; set ALPHAVANTAGE_API_KEY \
                 or add api_key to the config file."
                    .to_string(),
            );
        }

        let mut rows = Vec::with_capacity(fetched.len());
        for (symbol, full) in symbols.iter().zip(fetched) {
            if full.is_empty() {
                warnings.push(format!("No data available for {symbol}."));
            }
            // Snapshot before clipping: a window past the latest bar must
            // not blank the price column.
            let snap = metrics::snapshot(&full);
            rows.push(QuoteRow {
                symbol: symbol.clone(),
                current_price: snap.current_price,
                percent_change: snap.percent_change,
                series: full.clip(start, today),
            });
        }

        QuotesPage { rows, warnings }
    }
}

/// Attach volume shares to the raw tickers. Share math runs over the whole
/// table, so it happens here rather than per row.
fn market_rows(tickers: Vec<ExchangeTicker>) -> Vec<MarketRow> {
    let volumes: Vec<f64> = tickers.iter().map(|t| t.volume_24h).collect();
    let shares = metrics::volume_share_percent(&volumes);

    tickers
        .into_iter()
        .zip(shares)
        .map(|(ticker, volume_share_pct)| MarketRow {
            pair: ticker.pair(),
            liquidity_score: ticker.liquidity_score(),
            exchange: ticker.exchange,
            price: ticker.last_price,
            volume_24h: ticker.volume_24h,
            volume_share_pct,
            trade_url: ticker.trade_url,
        })
        .collect()
}
