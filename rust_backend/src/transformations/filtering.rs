//! Date-range and time-of-day selection over canonical points.
//!
//! Both filters work on local wall-clock terms, consistent with how the normalizer
//! interprets raw timestamps.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::domain::WeatherDataPoint;
use crate::error::{AnalysisError, AnalysisResult};
use crate::time::local_datetime;

/// Inclusive range of local calendar days. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AnalysisResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AnalysisError::InvalidParameter(format!(
                    "date range starts after it ends ({} > {})",
                    from, to
                )));
            }
        }
        Ok(Self { from, to })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Inclusive window of local time-of-day.
///
/// A window whose start is later than its end wraps past midnight (22:00–06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayRange {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimeOfDayRange {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start_time <= self.end_time {
            time >= self.start_time && time <= self.end_time
        } else {
            time >= self.start_time || time <= self.end_time
        }
    }
}

/// Keep the points whose local calendar day falls inside `range`.
pub fn filter_by_date_range<Tz: TimeZone>(
    points: &[WeatherDataPoint],
    range: &DateRange,
    tz: &Tz,
) -> Vec<WeatherDataPoint> {
    if range.is_unbounded() {
        return points.to_vec();
    }
    points
        .iter()
        .filter(|p| {
            local_datetime(p.timestamp, tz)
                .map(|dt| range.contains(dt.date()))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Keep the points whose local time-of-day falls inside `window`.
pub fn filter_by_time_of_day<Tz: TimeZone>(
    points: &[WeatherDataPoint],
    window: &TimeOfDayRange,
    tz: &Tz,
) -> Vec<WeatherDataPoint> {
    points
        .iter()
        .filter(|p| {
            local_datetime(p.timestamp, tz)
                .map(|dt| window.contains(dt.time()))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::SunPhase;
    use chrono::Utc;

    fn point_at(timestamp: i64) -> WeatherDataPoint {
        WeatherDataPoint {
            timestamp,
            temperature: 20.0,
            humidity: 50.0,
            lux: 0.0,
            aqi_ppm: 0.0,
            pressure: None,
            precipitation: "Unknown".to_string(),
            air_quality: "Unknown".to_string(),
            rain_analog: None,
            precipitation_intensity: None,
            sunrise_sunset: SunPhase::Sunset,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const JAN_5_0800_UTC: i64 = 1_704_441_600_000;
    const HOUR: i64 = 3_600_000;

    #[test]
    fn test_date_range_is_inclusive_on_both_ends() {
        let points: Vec<_> = (0..72).map(|h| point_at(JAN_5_0800_UTC + h * HOUR)).collect();
        let range = DateRange::new(Some(date(2024, 1, 6)), Some(date(2024, 1, 6))).unwrap();

        let kept = filter_by_date_range(&points, &range, &Utc);

        assert_eq!(kept.len(), 24);
        assert_eq!(kept[0].timestamp, JAN_5_0800_UTC + 16 * HOUR);
    }

    #[test]
    fn test_open_ended_range() {
        let points: Vec<_> = (0..48).map(|h| point_at(JAN_5_0800_UTC + h * HOUR)).collect();
        let range = DateRange::new(Some(date(2024, 1, 6)), None).unwrap();
        assert_eq!(filter_by_date_range(&points, &range, &Utc).len(), 32);
        assert_eq!(
            filter_by_date_range(&points, &DateRange::default(), &Utc).len(),
            48
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(DateRange::new(Some(date(2024, 2, 1)), Some(date(2024, 1, 1))).is_err());
    }

    #[test]
    fn test_time_of_day_window_wraps_midnight() {
        let window = TimeOfDayRange {
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        };
        let points: Vec<_> = (0..24).map(|h| point_at(JAN_5_0800_UTC + h * HOUR)).collect();

        let kept = filter_by_time_of_day(&points, &window, &Utc);

        // 22:00, 23:00, 00:00 .. 06:00
        assert_eq!(kept.len(), 9);
    }
}
