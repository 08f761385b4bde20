pub mod local;

pub use local::{
    format_raw_timestamp, local_datetime, local_to_epoch_millis, parse_naive_timestamp,
    parse_timestamp_millis_in, CalendarBucket, RAW_TIMESTAMP_LAYOUT,
};

/// Parse a raw sensor timestamp as local wall-clock time, returning epoch milliseconds.
///
/// The same string yields different epoch values on hosts in different time zones.
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    parse_timestamp_millis_in(raw, &chrono::Local)
}
