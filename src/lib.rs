// Robot Console Library
//
// Live market-data and trading-robot control core for the exchange
// dashboard: a streaming ticker client with a shared snapshot store, the
// per-account robot state machine, and paginated trade history.

pub mod clients;
pub mod config;
pub mod core;
pub mod error;

// Re-export core types
pub use crate::core::{
    canonicalize, decode_frame, estimate_volume, fallback_snapshot, resolve_display,
    AccountContext, AutomationController, BotPerformance, CanonicalSymbol, CoinDisplay,
    CurrencySelection, HistoryPage, Leverage, MarketDataStore, MarketSnapshot, RobotSettings,
    RobotState, SubscriptionId, Ticker, TradeHistoryPager, TradeRecord,
};

// Re-export client types
pub use clients::{ControlApiClient, StreamingMarketDataClient};

// Re-export configuration
pub use config::{ApiConfig, Config, ConfigError, StreamConfig};

// Re-export error types
pub use error::{ConsoleError, ConsoleResult};
