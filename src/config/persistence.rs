//! File persistence configuration

/// Configuration for the fired-alert history
pub struct AlertPersistenceConfig {
    /// SQLite file holding every dispatched alert
    pub db_path: &'static str,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub alerts: AlertPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    alerts: AlertPersistenceConfig {
        db_path: "alerts.sqlite",
        max_connections: 2, // Low connection count, this is low throughput
        busy_timeout_secs: 10,
    },
};
