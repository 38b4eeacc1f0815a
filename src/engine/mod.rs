mod core;
mod messages;
mod state;
mod worker;

pub use self::core::{MonitorSettings, PivotMonitor};
pub use messages::{MonitorStatus, MonitorTarget, PairScan};
pub use state::MonitoringLog;
pub use worker::scan_pair;
