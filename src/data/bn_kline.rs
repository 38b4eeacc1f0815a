use {
    anyhow::Result,
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    std::{convert::TryFrom, fmt},
};

use crate::{
    config::BinanceApiConfig,
    domain::{Candle, PairInterval},
    error::FetchError,
    utils::TimeUtils,
};

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, FetchError> {
    use TimeUtils as T;
    match ms {
        T::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        T::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        T::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        T::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        T::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        T::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        T::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        T::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        T::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        T::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        T::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        T::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        T::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        T::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        T::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        T::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(FetchError::Unsupported(format!(
            "interval {}ms",
            ms
        ))),
    }
}

/// One raw kline row: `[open_time, open, high, low, close, volume, close_time, ...]`.
#[derive(Debug, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub base_asset_volume: Option<f64>,
}

#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
        }
    }
}

impl std::error::Error for BNKlineError {}

fn convert_kline_item_inner_enum_string_to_float(kline: Option<KlinesItemInner>) -> Option<f64> {
    kline.and_then(|inner| {
        if let KlinesItemInner::String(s) = inner {
            s.parse::<f64>().ok()
        } else {
            None
        }
    })
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };

        Ok(BNKline {
            open_timestamp_ms,
            open_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            high_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            low_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            close_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            base_asset_volume: convert_kline_item_inner_enum_string_to_float(items.next()),
        })
    }
}

// Missing fields become NaN so the assembler rejects the row as malformed.
impl From<BNKline> for Candle {
    fn from(bn: BNKline) -> Self {
        Candle::new(
            bn.open_timestamp_ms,
            bn.open_price.unwrap_or(f64::NAN),
            bn.high_price.unwrap_or(f64::NAN),
            bn.low_price.unwrap_or(f64::NAN),
            bn.close_price.unwrap_or(f64::NAN),
            bn.base_asset_volume.unwrap_or(f64::NAN),
        )
    }
}

pub(crate) fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<Candle>, FetchError> {
    data.into_iter()
        .map(|row| {
            BNKline::try_from(row)
                .map(Candle::from)
                .map_err(|e| FetchError::Transport(format!("undecodable kline: {}", e)))
        })
        .collect()
}

pub(crate) fn configure_binance_client() -> Result<RestApi> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    // Create the Spot REST API client
    let rest_client = SpotRestApi::production(rest_conf);
    Ok(rest_client)
}

pub(crate) fn build_klines_params(
    pair_interval: &PairInterval,
    since: Option<i64>,
    limit: usize,
) -> Result<KlinesParams, FetchError> {
    KlinesParams::builder(
        pair_interval.bn_name(),
        try_interval_from_ms(pair_interval.interval_ms)?,
    )
    .limit(limit as i32)
    .start_time(since)
    .build()
    .map_err(|e| FetchError::Unsupported(format!("{}: {}", pair_interval, e)))
}

/// Classifies connector failures into the fetch taxonomy, logging each the way it deserves.
pub(crate) fn classify_connector_error(e: anyhow::Error, pair_interval: &PairInterval) -> FetchError {
    let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() else {
        log::error!(
            "An unexpected error occurred for {}: {:#}",
            pair_interval,
            e
        );
        return FetchError::Transport(format!("{}: {:#}", pair_interval, e));
    };

    let detail = format!("{}: {}", pair_interval, conn_err);
    match conn_err {
        connection_error::TooManyRequestsError(msg) => {
            log::warn!(
                "{} Rate limit exceeded. Please wait and try again. {}",
                pair_interval,
                msg
            );
            FetchError::RateLimited(detail)
        }
        connection_error::RateLimitBanError(msg) => {
            log::error!(
                "{} IP address banned due to excessive rate limits. {}",
                pair_interval,
                msg
            );
            FetchError::RateLimited(detail)
        }
        connection_error::NotFoundError(msg) => {
            log::error!("{} Resource not found. {}", pair_interval, msg);
            FetchError::NotFound(detail)
        }
        connection_error::BadRequestError(msg) | connection_error::ConnectorClientError(msg) => {
            // Binance answers unknown symbols with a 400
            log::warn!(
                "{} Bad request: Verify the pair exists. {}",
                pair_interval,
                msg
            );
            FetchError::NotFound(detail)
        }
        connection_error::ServerError { msg, status_code } => {
            log::error!(
                "{} Server error: {} (status code: {:?})",
                pair_interval,
                msg,
                status_code
            );
            FetchError::Transport(detail)
        }
        connection_error::NetworkError(msg) => {
            log::error!(
                "{} Network error: Check your internet connection. {}",
                pair_interval,
                msg
            );
            FetchError::Transport(detail)
        }
        other => {
            log::error!("Unexpected ConnectionError variant: {:?}", other);
            FetchError::Transport(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(open_time: i64, fields: &[&str]) -> Vec<KlinesItemInner> {
        let mut v = vec![KlinesItemInner::Integer(open_time)];
        v.extend(fields.iter().map(|s| KlinesItemInner::String(s.to_string())));
        v
    }

    #[test]
    fn converts_rows_to_candles() {
        let candles = convert_klines(vec![row(
            1_000,
            &["1.5", "2.0", "1.0", "1.8", "42.0"],
        )])
        .unwrap();
        assert_eq!(candles, vec![Candle::new(1_000, 1.5, 2.0, 1.0, 1.8, 42.0)]);
    }

    #[test]
    fn unparsable_price_becomes_nan() {
        let candles = convert_klines(vec![row(1_000, &["x", "2.0", "1.0", "1.8", "42.0"])]).unwrap();
        assert!(candles[0].open.is_nan());
        assert!(candles[0].validation_error().is_some());
    }

    #[test]
    fn missing_open_time_is_a_transport_error() {
        let bad = vec![KlinesItemInner::String("oops".into())];
        assert!(matches!(convert_klines(vec![bad]), Err(FetchError::Transport(_))));
    }

    #[test]
    fn unsupported_interval_is_rejected() {
        assert!(try_interval_from_ms(TimeUtils::MS_IN_H).is_ok());
        assert!(matches!(try_interval_from_ms(7), Err(FetchError::Unsupported(_))));
    }
}
