// Trend smoothing and pivot detection
pub mod ema;
pub mod zigzag;

pub use {
    ema::{calculate_ema, series_ema},
    zigzag::{Trend, ZigZag, ZigZagParams, calculate_zigzag},
};
