mod maths_utils;
mod perf;
mod ring;
mod time_utils;

pub use maths_utils::calculate_percent_diff;
pub use ring::BoundedRing;
pub use time_utils::{
    TimeUtils, epoch_ms_to_utc, format_table_time, now_timestamp_ms,
};

pub(crate) use maths_utils::{get_max, get_min};
