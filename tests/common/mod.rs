// Common test utilities and helpers

use robot_console::{ApiConfig, Config, StreamConfig};

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        stream: StreamConfig {
            url: "wss://stream.example-exchange.com/market".to_string(),
            pairs: vec!["btcusdt".to_string(), "ethusdt".to_string()],
            reconnect_initial_secs: 1,
            reconnect_max_secs: 2,
        },
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            session_token: "test-session-token".to_string(),
            control_timeout_secs: 5,
        },
    }
}

/// Build a single-symbol ticker frame the way the feed sends it
pub fn ticker_frame(symbol: &str, price: &str, change: &str) -> String {
    format!(
        r#"{{"{}": {{"price":"{}","change24h":"{}"}}}}"#,
        symbol, price, change
    )
}
