// Core console logic modules

pub mod history;
pub mod robot;
pub mod snapshot;
pub mod store;
pub mod symbols;
pub mod types;

// Re-export commonly used types
pub use history::{HistoryPage, TradeHistoryPager, TradeRecord};
pub use robot::{AutomationController, CurrencySelection, Leverage, RobotSettings};
pub use snapshot::{decode_frame, fallback_snapshot, BotPerformance, MarketSnapshot, Ticker};
pub use store::{MarketDataStore, SubscriptionId};
pub use symbols::{canonicalize, estimate_volume, resolve_display, CanonicalSymbol, CoinDisplay};
pub use types::{AccountContext, RobotState};
