use {
    crate::{
        domain::PairInterval,
        models::{Pivot, PivotKind},
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

/// A bottom confirmed on the candle that just closed. Consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub pair: String,
    pub timeframe: String,
    pub pivot: Pivot,
    pub fired_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(target: &PairInterval, pivot: Pivot) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair: target.name().to_string(),
            timeframe: target.timeframe().to_string(),
            pivot,
            fired_at: Utc::now(),
        }
    }

    /// Dedup identity: the same pivot on the same pair never fires twice.
    pub fn key(&self) -> (&str, DateTime<Utc>) {
        (&self.pair, self.pivot.time)
    }

    pub fn message(&self) -> String {
        let label = match self.pivot.kind {
            PivotKind::Low => "New bottom",
            PivotKind::High => "New top",
        };
        format!(
            "{} for {} ({}) at {:.8} on {}",
            label,
            self.pair,
            self.timeframe,
            self.pivot.price,
            self.pivot.formatted_time()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{TimeUtils, epoch_ms_to_utc};

    #[test]
    fn message_names_pair_price_and_time() {
        let target = PairInterval::new("ETH/USDT", TimeUtils::MS_IN_H);
        let event = AlertEvent::new(
            &target,
            Pivot {
                index: 1999,
                price: 2_500.5,
                kind: PivotKind::Low,
                time: epoch_ms_to_utc(1_709_649_000_000),
            },
        );
        assert_eq!(
            event.message(),
            "New bottom for ETH/USDT (1h) at 2500.50000000 on 05/03/2024 14:30"
        );
        assert_eq!(event.key().0, "ETH/USDT");
    }
}
