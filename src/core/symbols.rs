// Symbol normalization and display metadata lookup
//
// Pure functions, no state. Maps raw feed identifiers (e.g. "btcusdt") onto
// canonical BASE/QUOTE display symbols and resolves coin display metadata.

use rand::Rng;

/// Quote currencies recognized when splitting a concatenated feed symbol.
/// Checked longest-first so USDT wins over USD.
const KNOWN_QUOTES: [&str; 10] = [
    "USDT", "USDC", "BUSD", "TUSD", "USD", "EUR", "GBP", "BTC", "ETH", "BNB",
];

/// Fallback suffix length when no known quote matches. Approximate: quote
/// currencies shorter or longer than 4 characters split wrong here.
const QUOTE_SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSymbol {
    pub base: String,
    pub quote: String,
}

impl CanonicalSymbol {
    /// The normalized display form, e.g. "BTC/USDT".
    pub fn display(&self) -> String {
        if self.quote.is_empty() {
            self.base.clone()
        } else {
            format!("{}/{}", self.base, self.quote)
        }
    }
}

/// Split a feed-native identifier into base and quote currencies.
///
/// Tries the known-quote lookup first (longest suffix wins); only falls back
/// to the positional 4-character split for unrecognized suffixes.
pub fn canonicalize(raw_symbol: &str) -> CanonicalSymbol {
    let upper = raw_symbol.trim().to_ascii_uppercase();

    let mut quotes: Vec<&str> = KNOWN_QUOTES.to_vec();
    quotes.sort_by_key(|q| std::cmp::Reverse(q.len()));

    for quote in quotes {
        if upper.len() > quote.len() && upper.ends_with(quote) {
            let base = upper[..upper.len() - quote.len()].to_string();
            return CanonicalSymbol {
                base,
                quote: quote.to_string(),
            };
        }
    }

    // The feed can carry arbitrary keys; only split where it is safe
    let split = upper.len().saturating_sub(QUOTE_SUFFIX_LEN);
    if split > 0 && upper.is_char_boundary(split) {
        CanonicalSymbol {
            base: upper[..split].to_string(),
            quote: upper[split..].to_string(),
        }
    } else {
        CanonicalSymbol {
            base: upper,
            quote: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinDisplay {
    pub name: String,
    pub icon_url: String,
}

/// Resolve display metadata for a base currency. Unknown bases get a generic
/// placeholder so the UI never renders a broken image or blank label.
pub fn resolve_display(base: &str) -> CoinDisplay {
    let upper = base.to_ascii_uppercase();

    let name = match upper.as_str() {
        "BTC" => "Bitcoin",
        "ETH" => "Ethereum",
        "XRP" => "Ripple",
        "SOL" => "Solana",
        "ADA" => "Cardano",
        "DOGE" => "Dogecoin",
        "LTC" => "Litecoin",
        "DOT" => "Polkadot",
        "LINK" => "Chainlink",
        "AVAX" => "Avalanche",
        "TRX" => "Tron",
        "MATIC" => "Polygon",
        "BNB" => "BNB",
        "ATOM" => "Cosmos",
        "UNI" => "Uniswap",
        _ => {
            return CoinDisplay {
                name: upper.clone(),
                icon_url: "coins/generic.svg".to_string(),
            }
        }
    };

    CoinDisplay {
        name: name.to_string(),
        icon_url: format!("coins/{}.svg", upper.to_ascii_lowercase()),
    }
}

/// Display-only 24h volume estimate for ranking when the feed carries none.
///
/// Known majors come from a static table; anything else gets a bounded
/// pseudo-random placeholder. Never use this for financial decisions.
pub fn estimate_volume(symbol: &str) -> f64 {
    let base = canonicalize(symbol).base;

    match base.as_str() {
        "BTC" => 28_400_000_000.0,
        "ETH" => 11_900_000_000.0,
        "XRP" => 3_600_000_000.0,
        "SOL" => 2_800_000_000.0,
        "DOGE" => 1_400_000_000.0,
        "ADA" => 820_000_000.0,
        "LTC" => 610_000_000.0,
        "DOT" => 240_000_000.0,
        _ => rand::thread_rng().gen_range(50_000_000.0..500_000_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_known_quotes() {
        let symbol = canonicalize("btcusdt");
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USDT");
        assert_eq!(symbol.display(), "BTC/USDT");

        // Longest suffix wins: SOLUSD is USD, not a 4-char split "SO/LUSD"
        let symbol = canonicalize("solusd");
        assert_eq!(symbol.base, "SOL");
        assert_eq!(symbol.quote, "USD");

        let symbol = canonicalize("ETHBTC");
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "BTC");
    }

    #[test]
    fn test_canonicalize_positional_fallback() {
        // Unknown quote falls back to the 4-character split
        let symbol = canonicalize("abcwxyz");
        assert_eq!(symbol.base, "ABC");
        assert_eq!(symbol.quote, "WXYZ");
    }

    #[test]
    fn test_canonicalize_non_ascii_symbol() {
        // Keys come straight off the wire; a multi-byte character near the
        // suffix must not split mid-character
        let symbol = canonicalize("a€€");
        assert_eq!(symbol.base, "A€€");
        assert_eq!(symbol.quote, "");
        assert_eq!(symbol.display(), "A€€");

        // Non-ASCII base with a clean known-quote suffix still splits
        let symbol = canonicalize("é币usdt");
        assert_eq!(symbol.quote, "USDT");
    }

    #[test]
    fn test_canonicalize_short_symbol() {
        let symbol = canonicalize("btc");
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "");
        assert_eq!(symbol.display(), "BTC");
    }

    #[test]
    fn test_canonicalize_idempotent_for_four_letter_quotes() {
        for raw in ["btcusdt", "ethusdc", "dogebusd", "abcwxyz"] {
            let first = canonicalize(raw);
            let rejoined = format!("{}{}", first.base, first.quote);
            let second = canonicalize(&rejoined);
            assert_eq!(first, second, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_resolve_display_known_and_placeholder() {
        let btc = resolve_display("BTC");
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.icon_url, "coins/btc.svg");

        let unknown = resolve_display("zzz");
        assert_eq!(unknown.name, "ZZZ");
        assert_eq!(unknown.icon_url, "coins/generic.svg");
    }

    #[test]
    fn test_estimate_volume_table_and_bounds() {
        assert_eq!(estimate_volume("btcusdt"), 28_400_000_000.0);

        // Placeholder stays inside the documented bounds
        for _ in 0..50 {
            let volume = estimate_volume("abcwxyz");
            assert!((50_000_000.0..500_000_000.0).contains(&volume));
        }
    }
}
