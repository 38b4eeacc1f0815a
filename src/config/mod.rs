//! Configuration module for the pivot sentinel.

// Can all be private now because we have a public re-export.
mod binance;
mod debug;
mod monitor;
mod persistence;

// Re-export commonly used items
pub use binance::{BINANCE, BinanceApiConfig};
pub use debug::DF;
pub use monitor::{EMA, MONITOR, ZIGZAG};
pub use persistence::PERSISTENCE;
