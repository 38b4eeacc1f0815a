//! Alert delivery: the dispatcher plus the notify/persist collaborator seams.

mod dispatcher;
mod notifier;

use {anyhow::Result, async_trait::async_trait};

use crate::{domain::PairInterval, models::AlertEvent};

pub use {dispatcher::AlertDispatcher, notifier::LogNotifier};

/// Outbound notification channel (chat, email, log...). Fire-and-forget from the dispatcher's side.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, event: &AlertEvent) -> Result<()>;

    /// Sent once per successful activation.
    async fn notify_activation(&self, _targets: &[PairInterval]) -> Result<()> {
        Ok(())
    }
}

/// Append-only durable alert history.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn persist(&self, event: &AlertEvent) -> Result<()>;
}
