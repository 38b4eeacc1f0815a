mod alerts_repo;
mod assembler;
mod bn_kline;
mod provider;
mod rate_limiter;

pub use {
    alerts_repo::{SqliteAlertRepository, StoredAlert},
    assembler::{assemble_series, normalize_candles},
    provider::{BinanceProvider, MarketDataProvider},
    rate_limiter::GlobalRateLimiter,
};
