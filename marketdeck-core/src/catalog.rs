//! Static asset catalog: major coins, futures tickers per asset class, and
//! the default quote symbols.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A cataloged coin: API id plus display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinInfo {
    pub id: &'static str,
    pub ticker: &'static str,
    pub name: &'static str,
}

/// The major coins shown as cards on the crypto page.
pub const MAJOR_COINS: [CoinInfo; 5] = [
    CoinInfo {
        id: "bitcoin",
        ticker: "BTC",
        name: "Bitcoin",
    },
    CoinInfo {
        id: "ethereum",
        ticker: "ETH",
        name: "Ethereum",
    },
    CoinInfo {
        id: "binancecoin",
        ticker: "BNB",
        name: "BNB",
    },
    CoinInfo {
        id: "solana",
        ticker: "SOL",
        name: "Solana",
    },
    CoinInfo {
        id: "ripple",
        ticker: "XRP",
        name: "XRP",
    },
];

/// Futures asset classes on the overview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Livestock,
    Metal,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetClass::Livestock => "livestock",
            AssetClass::Metal => "metal",
        };
        f.write_str(name)
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "livestock" => Ok(AssetClass::Livestock),
            "metal" | "metals" => Ok(AssetClass::Metal),
            other => Err(format!(
                "unknown asset class '{other}' (expected livestock or metal)"
            )),
        }
    }
}

/// One overview asset: display name, futures ticker, and whether the ticker
/// stands in for a market with no liquid direct contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuturesAsset {
    pub name: &'static str,
    pub ticker: &'static str,
    pub proxy: bool,
}

impl FuturesAsset {
    /// Display label, marking proxy tickers.
    pub fn label(&self) -> String {
        if self.proxy {
            format!("{} ({} proxy)", self.name, self.ticker)
        } else {
            format!("{} ({})", self.name, self.ticker)
        }
    }
}

/// No liquid sheep or poultry contracts trade; feeder cattle and lean hogs
/// stand in.
pub const LIVESTOCK_ASSETS: [FuturesAsset; 3] = [
    FuturesAsset {
        name: "Cattle",
        ticker: "LE=F",
        proxy: false,
    },
    FuturesAsset {
        name: "Sheep",
        ticker: "GF=F",
        proxy: true,
    },
    FuturesAsset {
        name: "Poultry",
        ticker: "HE=F",
        proxy: true,
    },
];

pub const METAL_ASSETS: [FuturesAsset; 3] = [
    FuturesAsset {
        name: "Gold",
        ticker: "GC=F",
        proxy: false,
    },
    FuturesAsset {
        name: "Silver",
        ticker: "SI=F",
        proxy: false,
    },
    FuturesAsset {
        name: "Platinum",
        ticker: "PL=F",
        proxy: false,
    },
];

/// Default symbols on the quotes page.
pub const DEFAULT_QUOTE_SYMBOLS: [&str; 6] = ["BTC-USD", "ETH-USD", "AAPL", "MSFT", "GOOGL", "AMZN"];

pub fn assets_for(class: AssetClass) -> &'static [FuturesAsset] {
    match class {
        AssetClass::Livestock => &LIVESTOCK_ASSETS,
        AssetClass::Metal => &METAL_ASSETS,
    }
}

pub fn find_coin(id: &str) -> Option<&'static CoinInfo> {
    MAJOR_COINS.iter().find(|c| c.id == id)
}

pub fn find_asset(class: AssetClass, name: &str) -> Option<&'static FuturesAsset> {
    assets_for(class)
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}
