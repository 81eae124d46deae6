// Market snapshot model and stream frame decoding

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Latest known values for one feed symbol. Created only by frame decoding,
/// never client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
}

/// Performance card data for one public trading bot, pushed alongside the
/// ticker map when the subscription asks for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotPerformance {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub performance_label: String,
    pub period_label: String,
    pub copier_count: u32,
    #[serde(default)]
    pub sparkline: Vec<f64>,
}

/// The complete set of latest ticker values at a point in time.
///
/// Replaced wholesale on every decoded frame; never mutated after publication,
/// so concurrent readers can hold a reference without observing partial
/// updates.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub tickers: HashMap<String, Ticker>,
    pub bots: Vec<BotPerformance>,
    /// Set while the stream is disconnected: the data is the last good frame,
    /// not live.
    pub stale: bool,
}

impl MarketSnapshot {
    pub fn ticker(&self, symbol: &str) -> Option<&Ticker> {
        self.tickers.get(symbol)
    }
}

/// Decode one inbound stream frame.
///
/// The frame is a JSON object where every key except `tradingBots` is a raw
/// feed symbol mapping to `{price, change24h}` with string-encoded numbers.
/// Returns None if the payload is not usable at all; individual malformed
/// entries are skipped so one bad symbol does not drop the whole frame.
pub fn decode_frame(payload: &str) -> Option<MarketSnapshot> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            debug!("dropping undecodable frame: {}", e);
            return None;
        }
    };

    let object = value.as_object()?;

    let mut tickers = HashMap::new();
    let mut bots = Vec::new();

    for (key, entry) in object {
        if key == "tradingBots" {
            match serde_json::from_value::<Vec<BotPerformance>>(entry.clone()) {
                Ok(parsed) => bots = parsed,
                Err(e) => debug!("dropping tradingBots block: {}", e),
            }
            continue;
        }

        let Some(ticker) = decode_ticker(key, entry) else {
            debug!("skipping malformed ticker entry for {}", key);
            continue;
        };
        tickers.insert(key.clone(), ticker);
    }

    if tickers.is_empty() && bots.is_empty() {
        return None;
    }

    Some(MarketSnapshot {
        tickers,
        bots,
        stale: false,
    })
}

fn decode_ticker(symbol: &str, entry: &Value) -> Option<Ticker> {
    let price = entry.get("price")?.as_str()?.parse::<f64>().ok()?;
    let change_24h = entry.get("change24h")?.as_str()?.parse::<f64>().ok()?;

    Some(Ticker {
        symbol: symbol.to_string(),
        price,
        change_24h,
    })
}

/// Built-in placeholder snapshot shown before the first live frame arrives.
/// Prices are representative only; marked stale so views can badge it.
pub fn fallback_snapshot() -> MarketSnapshot {
    let seed: [(&str, f64, f64); 8] = [
        ("btcusdt", 83_738.10, -2.89),
        ("ethusdt", 1_887.45, -1.42),
        ("xrpusdt", 2.17, 0.65),
        ("solusdt", 126.30, -3.10),
        ("adausdt", 0.71, 0.12),
        ("dogeusdt", 0.168, -0.95),
        ("ltcusdt", 91.24, 1.08),
        ("dotusdt", 4.02, -0.44),
    ];

    let tickers = seed
        .iter()
        .map(|(symbol, price, change)| {
            (
                symbol.to_string(),
                Ticker {
                    symbol: symbol.to_string(),
                    price: *price,
                    change_24h: *change,
                },
            )
        })
        .collect();

    MarketSnapshot {
        tickers,
        bots: Vec::new(),
        stale: true,
    }
}
