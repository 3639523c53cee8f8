//! Price quotes and snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display facts for assets the dashboard knows by name.
struct AssetLabel {
    id: &'static str,
    ticker: &'static str,
    name: &'static str,
    symbol: &'static str,
    precision: usize,
}

const KNOWN_ASSETS: &[AssetLabel] = &[
    AssetLabel {
        id: "aditi",
        ticker: "ADITI",
        name: "ADITI",
        symbol: "ADT",
        precision: 4,
    },
    AssetLabel {
        id: "ethereum",
        ticker: "ETH",
        name: "Ethereum",
        symbol: "ETH",
        precision: 2,
    },
    AssetLabel {
        id: "binancecoin",
        ticker: "BNB",
        name: "BNB",
        symbol: "BNB",
        precision: 2,
    },
];

/// Current price of one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub asset_id: String,
    pub price: f64,
    /// Percent change over 24 hours.
    pub change_24h: f64,
}

impl PriceQuote {
    /// A zero quote, shown before the first successful fetch.
    pub fn zero(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            price: 0.0,
            change_24h: 0.0,
        }
    }

    fn label(&self) -> Option<&'static AssetLabel> {
        KNOWN_ASSETS.iter().find(|a| a.id == self.asset_id)
    }

    /// Short label for the compact ticker, e.g. `ETH`.
    pub fn ticker_label(&self) -> String {
        self.label()
            .map(|l| l.ticker.to_string())
            .unwrap_or_else(|| self.asset_id.to_uppercase())
    }

    /// `(name, symbol)` for the detailed view.
    pub fn display_name(&self) -> (String, String) {
        match self.label() {
            Some(l) => (l.name.to_string(), l.symbol.to_string()),
            None => (self.asset_id.clone(), self.asset_id.to_uppercase()),
        }
    }

    /// Price with the asset's usual precision, e.g. `$2450.10`.
    pub fn format_price(&self) -> String {
        let precision = self
            .label()
            .map(|l| l.precision)
            .unwrap_or(if self.price < 1.0 { 4 } else { 2 });
        format!("${:.*}", precision, self.price)
    }

    /// Signed 24h change, e.g. `+1.23%` or `-0.50%`.
    pub fn format_change(&self) -> String {
        format_change(self.change_24h)
    }
}

/// Signed percentage with two decimals; zero counts as positive.
pub fn format_change(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// All quotes from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub quotes: Vec<PriceQuote>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set when the latest refresh failed and these are older values.
    pub stale: bool,
}

impl PriceSnapshot {
    /// Zero prices for `asset_ids`, never fetched.
    pub fn placeholder(asset_ids: &[String]) -> Self {
        Self {
            quotes: asset_ids.iter().map(PriceQuote::zero).collect(),
            fetched_at: None,
            stale: true,
        }
    }

    pub fn quote(&self, asset_id: &str) -> Option<&PriceQuote> {
        self.quotes.iter().find(|q| q.asset_id == asset_id)
    }

    /// One-line ticker: `ADITI: $0.0100  ETH: $2450.10  BNB: $300.00`.
    pub fn ticker_line(&self) -> String {
        let line = self
            .quotes
            .iter()
            .map(|q| format!("{}: {}", q.ticker_label(), q.format_price()))
            .collect::<Vec<_>>()
            .join("  ");
        if self.stale && self.fetched_at.is_some() {
            format!("{}  (stale)", line)
        } else {
            line
        }
    }

    /// One row per asset with name, symbol, price and 24h change.
    pub fn detailed_lines(&self) -> Vec<String> {
        self.quotes
            .iter()
            .map(|q| {
                let (name, symbol) = q.display_name();
                format!(
                    "{:<10} {:<5} {:>14}  24h Change: {}",
                    name,
                    symbol,
                    q.format_price(),
                    q.format_change()
                )
            })
            .collect()
    }
}
