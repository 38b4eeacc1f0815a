#![allow(clippy::const_is_empty)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod alerts;
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types outside of crate
pub use alerts::{AlertDispatcher, AlertNotifier, AlertSink, LogNotifier};
pub use analysis::{ZigZag, ZigZagParams, calculate_ema, calculate_zigzag};
pub use config::{EMA, MONITOR, PERSISTENCE, ZIGZAG};
pub use data::{BinanceProvider, MarketDataProvider, SqliteAlertRepository, assemble_series};
pub use domain::{Candle, PairInterval};
pub use engine::{MonitorSettings, MonitorStatus, PivotMonitor};
pub use models::{AlertEvent, OhlcvTimeSeries, Pivot, PivotKind, PivotReport};

// CLI argument parsing
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Watch pairs and alert when a bottom confirms on the candle that just closed
    Monitor {
        /// Pairs separated by ';', e.g. "BTC/USDT;ETH/USDT"
        #[arg(long)]
        pairs: String,

        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Pairs per polling worker
        #[arg(long, default_value_t = MONITOR.shard_size)]
        shard_size: usize,

        /// SQLite file for the alert history
        #[arg(long, default_value = PERSISTENCE.alerts.db_path)]
        db: String,

        /// Skip the alert history entirely
        #[arg(long, default_value_t = false)]
        no_db: bool,

        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Fetch one pair, print its pivots and exit
    Pivots {
        #[arg(long)]
        pair: String,

        #[arg(long, default_value = "1d")]
        timeframe: String,

        #[arg(long, default_value_t = EMA.period)]
        ema_period: usize,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        detector: DetectorArgs,
    },
}

/// Detector overrides shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Candles assembled per pair
    #[arg(long, default_value_t = MONITOR.candle_count)]
    pub candles: usize,

    /// Half-width of the extremum window
    #[arg(long, default_value_t = ZIGZAG.legs)]
    pub legs: usize,

    /// Minimum reversal in percent
    #[arg(long, default_value_t = ZIGZAG.deviation_pct)]
    pub deviation: f64,

    /// Keep only the newest N tops and bottoms (0 keeps all)
    #[arg(long)]
    pub max_points: Option<usize>,
}

impl DetectorArgs {
    pub fn zigzag_params(&self) -> ZigZagParams {
        let max_points = match self.max_points {
            Some(0) => None,
            Some(n) => Some(n),
            None => ZIGZAG.max_points,
        };
        ZigZagParams::new(self.legs, self.deviation, max_points)
    }
}
