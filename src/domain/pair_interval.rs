use {
    crate::{error::StateError, utils::TimeUtils},
    serde::{Deserialize, Serialize},
};

/// A monitored pair on one timeframe, e.g. `BTC/USDT` @ 1h.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    /// Exchange-neutral `BASE/QUOTE` form
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            name: name.into(),
            interval_ms,
        }
    }

    pub fn get_base(text: &str) -> Option<&str> {
        text.split_once('/').map(|(base, _)| base)
    }

    pub fn get_quote(text: &str) -> Option<&str> {
        text.split_once('/').map(|(_, quote)| quote)
    }

    /// The name we pass into the Binance API (`BTC/USDT` -> `BTCUSDT`)
    pub fn bn_name(&self) -> String {
        self.name.replace('/', "").to_uppercase()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeframe(&self) -> &'static str {
        TimeUtils::interval_to_string(self.interval_ms)
    }

    /// Validates a single `BASE/QUOTE` token.
    pub fn parse_pair(text: &str) -> Result<String, StateError> {
        let trimmed = text.trim();
        match trimmed.split_once('/') {
            Some((base, quote))
                if !base.is_empty()
                    && !quote.is_empty()
                    && !quote.contains('/')
                    && !trimmed.contains(char::is_whitespace) =>
            {
                Ok(trimmed.to_uppercase())
            }
            _ => Err(StateError::InvalidPair(trimmed.to_string())),
        }
    }

    /// Splits a `"A/USDT;B/USDT"` style list into targets. Blank entries are skipped, duplicates dropped.
    pub fn parse_list(
        pairs: &str,
        separator: char,
        timeframe: &str,
    ) -> Result<Vec<PairInterval>, StateError> {
        let interval_ms = TimeUtils::interval_from_string(timeframe)
            .ok_or_else(|| StateError::InvalidTimeframe(timeframe.to_string()))?;

        let mut targets: Vec<PairInterval> = Vec::new();
        for token in pairs.split(separator).filter(|t| !t.trim().is_empty()) {
            let name = Self::parse_pair(token)?;
            if !targets.iter().any(|t| t.name == name) {
                targets.push(PairInterval::new(name, interval_ms));
            }
        }

        if targets.is_empty() {
            return Err(StateError::NoTargets);
        }
        Ok(targets)
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let base = Self::get_base(&self.name).unwrap_or("UNKNOWN_BASE");
        let quote = Self::get_quote(&self.name).unwrap_or("UNKNOWN_QUOTE");
        write!(
            f,
            "{}/{} @ {}",
            base,
            quote,
            TimeUtils::interval_to_string(self.interval_ms)
        )
    }
}
