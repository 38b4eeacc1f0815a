use {anyhow::Context, async_trait::async_trait, binance_sdk::spot::rest_api::RestApi};

use crate::{
    config::BINANCE,
    data::{
        GlobalRateLimiter,
        bn_kline::{
            build_klines_params, classify_connector_error, configure_binance_client,
            convert_klines,
        },
    },
    domain::{Candle, PairInterval},
    error::FetchError,
};

/// Abstract interface for fetching market data. The only seam that touches the network.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch at most `limit` candles for `pair`, oldest first, starting at `since`
    /// (open time, ms) or ending at the most recent candle when `since` is `None`.
    async fn fetch_batch(
        &self,
        pair: &PairInterval,
        since: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError>;
}

/// `MarketDataProvider` backed by the Binance spot REST API.
pub struct BinanceProvider {
    rest_client: RestApi,
    limiter: GlobalRateLimiter,
}

impl BinanceProvider {
    pub fn new(limiter: GlobalRateLimiter) -> anyhow::Result<Self> {
        let rest_client = configure_binance_client().context("Failed to configure Binance client")?;
        Ok(Self {
            rest_client,
            limiter,
        })
    }

    /// Provider with the default per-minute weight budget.
    pub fn with_default_limits() -> anyhow::Result<Self> {
        Self::new(GlobalRateLimiter::new(BINANCE.limits.weight_limit_minute))
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_batch(
        &self,
        pair: &PairInterval,
        since: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        let limit = limit.clamp(1, BINANCE.limits.klines_limit);
        let params = build_klines_params(pair, since, limit)?;

        self.limiter
            .acquire(BINANCE.limits.kline_call_weight, pair.name())
            .await;

        let response = self
            .rest_client
            .klines(params)
            .await
            .map_err(|e| classify_connector_error(anyhow::Error::from(e), pair))?;
        let rows = response
            .data()
            .await
            .map_err(|e| classify_connector_error(anyhow::Error::from(e), pair))?;

        convert_klines(rows)
    }
}
