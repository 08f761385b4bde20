use chrono::{
    Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::domain::{BucketLevel, DurationLevel};

/// Layout of sensor timestamps, `dd/MM/yyyy HH:mm:ss` (day and month may be one digit).
pub const RAW_TIMESTAMP_LAYOUT: &str = "%d/%m/%Y %H:%M:%S";

static RAW_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}) (\d{2}):(\d{2}):(\d{2})$")
        .expect("raw timestamp pattern is valid")
});

/// Parse a raw sensor timestamp into a wall-clock date/time.
///
/// The string must match `d{1,2}/d{1,2}/d{4} HH:mm:ss` exactly, and the fields must form a
/// real calendar date and time (no 31st of April, no hour 24).
///
/// # Example
/// ```
/// use weather_core::time::parse_naive_timestamp;
///
/// assert!(parse_naive_timestamp("5/1/2024 08:00:00").is_some());
/// assert!(parse_naive_timestamp("31/04/2024 08:00:00").is_none());
/// assert!(parse_naive_timestamp("2024-01-05").is_none());
/// ```
pub fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let caps = RAW_TIMESTAMP_RE.captures(raw)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let day = field(1)?;
    let month = field(2)?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(field(4)?, field(5)?, field(6)?)?;

    Some(date.and_time(time))
}

/// Resolve a wall-clock time in `tz` to epoch milliseconds.
///
/// Ambiguous times (clocks falling back) resolve to the earlier instant; times inside a
/// spring-forward gap are moved one hour later, the way browsers construct local dates.
pub fn local_to_epoch_millis<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<i64> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.timestamp_millis()),
        LocalResult::Ambiguous(a, b) => Some(a.timestamp_millis().min(b.timestamp_millis())),
        LocalResult::None => tz
            .from_local_datetime(&(*naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp_millis()),
    }
}

/// Parse a raw sensor timestamp as wall-clock time in `tz`, returning epoch milliseconds.
pub fn parse_timestamp_millis_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<i64> {
    parse_naive_timestamp(raw).and_then(|naive| local_to_epoch_millis(&naive, tz))
}

/// Wall-clock date/time in `tz` for an epoch-millisecond timestamp.
pub fn local_datetime<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<NaiveDateTime> {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.naive_local())
}

/// Format an epoch-millisecond timestamp back into the raw sensor layout.
pub fn format_raw_timestamp<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<String> {
    local_datetime(millis, tz).map(|dt| dt.format(RAW_TIMESTAMP_LAYOUT).to_string())
}

/// Calendar window a timestamp falls into, in local wall-clock terms.
///
/// Ordering follows calendar order within one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CalendarBucket {
    Hour { date: NaiveDate, hour: u32 },
    Day(NaiveDate),
    /// ISO-8601 week; `iso_year` may differ from the calendar year around New Year.
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl CalendarBucket {
    pub fn for_bucket_level(dt: &NaiveDateTime, level: BucketLevel) -> Self {
        match level {
            BucketLevel::Hourly => CalendarBucket::Hour {
                date: dt.date(),
                hour: dt.hour(),
            },
            BucketLevel::Daily => CalendarBucket::Day(dt.date()),
            BucketLevel::Weekly => Self::iso_week(dt),
            BucketLevel::Monthly => CalendarBucket::Month {
                year: dt.year(),
                month: dt.month(),
            },
        }
    }

    pub fn for_duration_level(dt: &NaiveDateTime, level: DurationLevel) -> Self {
        match level {
            DurationLevel::Weekly => Self::iso_week(dt),
            DurationLevel::Monthly => CalendarBucket::Month {
                year: dt.year(),
                month: dt.month(),
            },
            DurationLevel::Annually => CalendarBucket::Year(dt.year()),
        }
    }

    fn iso_week(dt: &NaiveDateTime) -> Self {
        let iso = dt.iso_week();
        CalendarBucket::Week {
            iso_year: iso.year(),
            week: iso.week(),
        }
    }

    /// Human-readable label for the window.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use weather_core::time::CalendarBucket;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    /// assert_eq!(CalendarBucket::Day(date).label(), "05/01/2024");
    /// assert_eq!(CalendarBucket::Month { year: 2024, month: 1 }.label(), "Jan 2024");
    /// ```
    pub fn label(&self) -> String {
        match self {
            CalendarBucket::Hour { date, hour } => {
                format!("{} {:02}:00", date.format("%d/%m/%Y"), hour)
            }
            CalendarBucket::Day(date) => date.format("%d/%m/%Y").to_string(),
            CalendarBucket::Week { iso_year, week } => format!("Week {}, {}", week, iso_year),
            CalendarBucket::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| format!("{:04}-{:02}", year, month)),
            CalendarBucket::Year(year) => year.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Local, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    /// Central European rules for 2024 only: UTC+1, and UTC+2 from 31 Mar 01:00 UTC
    /// until 27 Oct 01:00 UTC.
    #[derive(Debug, Clone, Copy)]
    struct SummerTime2024;

    impl SummerTime2024 {
        fn standard() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl TimeZone for SummerTime2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SummerTime2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            // The later instant comes first so resolution cannot rely on variant order.
            let valid: Vec<FixedOffset> = [Self::standard(), Self::summer()]
                .into_iter()
                .filter(|offset| {
                    let utc = *local - Duration::seconds(offset.local_minus_utc() as i64);
                    self.offset_from_utc_datetime(&utc) == *offset
                })
                .collect();
            match valid.as_slice() {
                [] => LocalResult::None,
                [only] => LocalResult::Single(*only),
                [first, second, ..] => LocalResult::Ambiguous(*first, *second),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let starts = naive(2024, 3, 31, 1, 0, 0);
            let ends = naive(2024, 10, 27, 1, 0, 0);
            if *utc >= starts && *utc < ends {
                Self::summer()
            } else {
                Self::standard()
            }
        }
    }

    fn utc_millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.from_utc_datetime(&naive(y, m, d, h, min, 0)).timestamp_millis()
    }

    #[test]
    fn test_spring_forward_gap_moves_one_hour_later() {
        // 02:30 does not exist on 31 Mar; 03:30 CEST is 01:30 UTC.
        assert_eq!(
            parse_timestamp_millis_in("31/03/2024 02:30:00", &SummerTime2024),
            Some(utc_millis(2024, 3, 31, 1, 30))
        );
    }

    #[test]
    fn test_fall_back_ambiguity_takes_earlier_instant() {
        // 02:30 happens twice on 27 Oct: 00:30 UTC (CEST) and 01:30 UTC (CET).
        assert_eq!(
            parse_timestamp_millis_in("27/10/2024 02:30:00", &SummerTime2024),
            Some(utc_millis(2024, 10, 27, 0, 30))
        );
    }

    #[test]
    fn test_unambiguous_times_around_transitions() {
        assert_eq!(
            parse_timestamp_millis_in("31/03/2024 01:30:00", &SummerTime2024),
            Some(utc_millis(2024, 3, 31, 0, 30))
        );
        assert_eq!(
            parse_timestamp_millis_in("27/10/2024 03:30:00", &SummerTime2024),
            Some(utc_millis(2024, 10, 27, 2, 30))
        );
        assert_eq!(
            local_datetime(utc_millis(2024, 7, 1, 10, 0), &SummerTime2024),
            Some(naive(2024, 7, 1, 12, 0, 0))
        );
    }

    #[test]
    fn test_parse_accepts_single_digit_day_and_month() {
        assert_eq!(
            parse_naive_timestamp("5/1/2024 08:00:00"),
            Some(naive(2024, 1, 5, 8, 0, 0))
        );
        assert_eq!(
            parse_naive_timestamp("05/01/2024 23:59:59"),
            Some(naive(2024, 1, 5, 23, 59, 59))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_and_impossible_dates() {
        for raw in [
            "2024-01-05",
            "05/01/2024",
            "05/01/2024 8:00:00",
            "05/01/24 08:00:00",
            " 05/01/2024 08:00:00",
            "30/02/2024 08:00:00",
            "05/13/2024 08:00:00",
            "05/01/2024 24:00:00",
            "05/01/2024 10:60:00",
            "",
        ] {
            assert!(parse_naive_timestamp(raw).is_none(), "accepted {:?}", raw);
        }
        assert!(parse_naive_timestamp("29/02/2024 00:00:00").is_some());
    }

    #[test]
    fn test_timestamp_is_wall_clock_in_zone() {
        let utc = parse_timestamp_millis_in("05/01/2024 08:00:00", &Utc).unwrap();
        assert_eq!(utc, 1_704_441_600_000);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = parse_timestamp_millis_in("05/01/2024 08:00:00", &plus_two).unwrap();
        assert_eq!(utc - shifted, 2 * 3_600_000);
    }

    #[test]
    fn test_local_zone_matches_chrono_local() {
        let expected = Local
            .from_local_datetime(&naive(2024, 1, 5, 8, 0, 0))
            .earliest()
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            parse_timestamp_millis_in("05/01/2024 08:00:00", &Local),
            Some(expected)
        );
    }

    #[test]
    fn test_format_round_trip() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let millis = parse_timestamp_millis_in("07/03/2024 14:05:09", &tz).unwrap();
        assert_eq!(
            format_raw_timestamp(millis, &tz).as_deref(),
            Some("07/03/2024 14:05:09")
        );
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2024-12-30 is Monday of ISO week 1 of 2025.
        let dt = naive(2024, 12, 30, 12, 0, 0);
        let bucket = CalendarBucket::for_bucket_level(&dt, BucketLevel::Weekly);
        assert_eq!(
            bucket,
            CalendarBucket::Week {
                iso_year: 2025,
                week: 1
            }
        );
        assert_eq!(bucket.label(), "Week 1, 2025");
    }

    #[test]
    fn test_bucket_labels() {
        let dt = naive(2024, 1, 5, 8, 42, 0);
        assert_eq!(
            CalendarBucket::for_bucket_level(&dt, BucketLevel::Hourly).label(),
            "05/01/2024 08:00"
        );
        assert_eq!(
            CalendarBucket::for_duration_level(&dt, DurationLevel::Annually).label(),
            "2024"
        );
        assert_eq!(
            CalendarBucket::for_duration_level(&dt, DurationLevel::Monthly).label(),
            "Jan 2024"
        );
    }
}
