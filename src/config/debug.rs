//! Debugging feature flags.

pub struct LogFlags {
    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,

    /// Per-pair sweep summaries (last tops/bottoms, last close)
    pub log_pair_scans: bool,

    /// Every page request made by the series assembler
    pub log_assembler_pages: bool,

    pub log_dispatcher: bool,

    pub log_rate_limiter: bool,
}

pub const DF: LogFlags = LogFlags {
    log_performance: false,

    log_pair_scans: true,
    log_assembler_pages: false,
    log_dispatcher: true,
    log_rate_limiter: true,
};
