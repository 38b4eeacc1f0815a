use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    sqlx::{
        Row,
        sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
            SqliteSynchronous,
        },
    },
    std::{str::FromStr, time::Duration},
};

use crate::{
    alerts::AlertSink,
    config::PERSISTENCE,
    models::AlertEvent,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// One row of the `alerts` table, as read back for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlert {
    pub alert_id: String,
    pub pair: String,
    pub timeframe: String,
    pub kind: String,
    pub price: f64,
    pub pivot_time: DateTime<Utc>,
    pub fired_at: DateTime<Utc>,
}

/// Append-only SQLite history of every dispatched alert.
pub struct SqliteAlertRepository {
    pool: SqlitePool,
}

impl SqliteAlertRepository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let cfg = &PERSISTENCE.alerts;
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs))
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(connection_options)
            .await
            .with_context(|| format!("Failed to connect to {}", db_path))?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool (e.g. `sqlite::memory:`) and makes sure the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alerts (
                alert_id TEXT PRIMARY KEY,
                pair TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                kind TEXT NOT NULL,
                price REAL NOT NULL,
                pivot_index INTEGER NOT NULL,
                pivot_time INTEGER NOT NULL,
                fired_at INTEGER NOT NULL,
                message TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create alerts table")?;
        Ok(())
    }

    pub async fn record(&self, event: &AlertEvent) -> Result<()> {
        #[cfg(debug_assertions)]
        if DF.log_dispatcher {
            log::info!("ALERTS DB: Archiving alert [{}] {}", event.pair, event.id);
        }

        sqlx::query(
            r#"
            INSERT INTO alerts
            (alert_id, pair, timeframe, kind, price, pivot_index, pivot_time, fired_at, message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.pair)
        .bind(&event.timeframe)
        .bind(event.pivot.kind.to_string())
        .bind(event.pivot.price)
        .bind(event.pivot.index as i64)
        .bind(event.pivot.time.timestamp_millis())
        .bind(event.fired_at.timestamp_millis())
        .bind(event.message())
        .execute(&self.pool)
        .await
        .context("Failed to insert alert")?;

        Ok(())
    }

    /// Newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<StoredAlert>> {
        let rows = sqlx::query(
            "SELECT alert_id, pair, timeframe, kind, price, pivot_time, fired_at
             FROM alerts ORDER BY fired_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to read alerts")?;

        rows.into_iter()
            .map(|r| -> Result<StoredAlert> {
                let pivot_ms: i64 = r.try_get("pivot_time")?;
                let fired_ms: i64 = r.try_get("fired_at")?;
                Ok(StoredAlert {
                    alert_id: r.try_get("alert_id")?,
                    pair: r.try_get("pair")?,
                    timeframe: r.try_get("timeframe")?,
                    kind: r.try_get("kind")?,
                    price: r.try_get("price")?,
                    pivot_time: DateTime::from_timestamp_millis(pivot_ms).unwrap_or_default(),
                    fired_at: DateTime::from_timestamp_millis(fired_ms).unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl AlertSink for SqliteAlertRepository {
    async fn persist(&self, event: &AlertEvent) -> Result<()> {
        self.record(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::PairInterval,
        models::{Pivot, PivotKind},
        utils::{TimeUtils, epoch_ms_to_utc},
    };

    async fn memory_repo() -> SqliteAlertRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteAlertRepository::from_pool(pool).await.unwrap()
    }

    fn event(pair: &str, price: f64) -> AlertEvent {
        AlertEvent::new(
            &PairInterval::new(pair, TimeUtils::MS_IN_H),
            Pivot {
                index: 1999,
                price,
                kind: PivotKind::Low,
                time: epoch_ms_to_utc(1_709_649_000_000),
            },
        )
    }

    #[tokio::test]
    async fn persisted_alerts_read_back_newest_first() {
        let repo = memory_repo().await;
        repo.persist(&event("BTC/USDT", 60_000.0)).await.unwrap();
        repo.persist(&event("ETH/USDT", 3_000.0)).await.unwrap();

        let rows = repo.recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pair, "ETH/USDT");
        assert_eq!(rows[0].kind, "bottom");
        assert_eq!(rows[1].price, 60_000.0);
        assert_eq!(rows[1].pivot_time.timestamp_millis(), 1_709_649_000_000);

        assert_eq!(repo.recent(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn alert_ids_are_unique() {
        let repo = memory_repo().await;
        let e = event("BTC/USDT", 1.0);
        repo.record(&e).await.unwrap();
        assert!(repo.record(&e).await.is_err());
    }
}
