// External transport clients

pub mod rest;
pub mod stream;

// Re-export client types
pub use rest::ControlApiClient;
pub use stream::StreamingMarketDataClient;
