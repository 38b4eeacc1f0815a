use thiserror::Error;

/// Failures of the exchange fetch collaborator. Recovered by skipping the pair for this cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unsupported request: {0}")]
    Unsupported(String),
}

/// Failures while turning raw batches into a `Series`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("{pair}: exchange returned no candles")]
    EmptyBatch { pair: String },

    #[error("{pair}: malformed candle at {open_time_ms}: {reason}")]
    Malformed {
        pair: String,
        open_time_ms: i64,
        reason: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Rejected detector parameters. A series that is merely too short is not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("legs must be at least 1")]
    InvalidLegs,

    #[error("deviation must be a positive percentage, got {0}")]
    InvalidDeviation(f64),
}

/// Session lifecycle errors; the only errors surfaced to callers of the monitor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("monitoring is already active")]
    AlreadyActive,

    #[error("no pairs to monitor")]
    NoTargets,

    #[error("unsupported timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("invalid pair '{0}', expected BASE/QUOTE")]
    InvalidPair(String),
}
