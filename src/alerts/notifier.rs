use {anyhow::Result, async_trait::async_trait, itertools::Itertools};

use crate::{alerts::AlertNotifier, domain::PairInterval, models::AlertEvent};

/// Writes alerts to the application log. Always available, needs no credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        log::warn!("🔔 {}", event.message());
        Ok(())
    }

    async fn notify_activation(&self, targets: &[PairInterval]) -> Result<()> {
        let timeframe = targets.first().map(|t| t.timeframe()).unwrap_or("unknown");
        log::info!(
            "Monitoring activated on {} for: {}",
            timeframe,
            targets.iter().map(|t| t.name()).join(", ")
        );
        Ok(())
    }
}
