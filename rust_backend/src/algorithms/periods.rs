//! Day/night segmentation of a time-ordered point series.

use chrono::{Local, TimeZone};
use log::{debug, warn};
use std::collections::HashMap;

use crate::algorithms::stats::mean;
use crate::core::domain::{
    AggregatedDurationData, DayNightPeriod, DurationLevel, PeriodKind, WeatherDataPoint,
};
use crate::time::{local_datetime, CalendarBucket};

/// Split `points` into maximal runs of equal day/night classification.
///
/// A classification change at point `p` closes the open period at `p.timestamp` and opens the
/// next period there. The final period closes at the last point's timestamp.
///
/// # Example
/// ```
/// use weather_core::algorithms::periods::segment;
///
/// assert!(segment(&[]).is_empty());
/// ```
pub fn segment(points: &[WeatherDataPoint]) -> Vec<DayNightPeriod> {
    let mut periods = Vec::new();
    let Some(first) = points.first() else {
        return periods;
    };

    let mut open_kind = first.sunrise_sunset.period_kind();
    let mut open_start = first.timestamp;

    for point in &points[1..] {
        let kind = point.sunrise_sunset.period_kind();
        if kind != open_kind {
            periods.push(DayNightPeriod::new(open_kind, open_start, point.timestamp));
            open_kind = kind;
            open_start = point.timestamp;
        }
    }

    if let Some(last) = points.last() {
        periods.push(DayNightPeriod::new(open_kind, open_start, last.timestamp));
    }
    periods
}

#[derive(Default)]
struct DurationGroup {
    period_start: i64,
    day: Vec<f64>,
    night: Vec<f64>,
}

/// Regroup periods by the calendar window of their start, interpreting time in `tz`.
///
/// Groups are ordered by the earliest period start they contain.
pub fn aggregate_durations_in<Tz: TimeZone>(
    periods: &[DayNightPeriod],
    level: DurationLevel,
    tz: &Tz,
) -> Vec<AggregatedDurationData> {
    let mut groups: HashMap<CalendarBucket, DurationGroup> = HashMap::new();

    for period in periods {
        let Some(local) = local_datetime(period.start_timestamp, tz) else {
            warn!(
                "Skipping period with out-of-range start {}",
                period.start_timestamp
            );
            continue;
        };
        let key = CalendarBucket::for_duration_level(&local, level);
        let group = groups.entry(key).or_insert_with(|| DurationGroup {
            period_start: period.start_timestamp,
            ..Default::default()
        });
        group.period_start = group.period_start.min(period.start_timestamp);

        let duration = period.duration as f64;
        match period.kind {
            PeriodKind::Day => group.day.push(duration),
            PeriodKind::Night => group.night.push(duration),
        }
    }

    let mut aggregated: Vec<AggregatedDurationData> = groups
        .into_iter()
        .map(|(key, group)| AggregatedDurationData {
            period_label: key.label(),
            period_start: group.period_start,
            avg_day_duration: mean(&group.day),
            avg_night_duration: mean(&group.night),
            day_count: group.day.len(),
            night_count: group.night.len(),
        })
        .collect();
    aggregated.sort_by_key(|d| d.period_start);

    debug!(
        "Regrouped {} periods into {} {:?} groups",
        periods.len(),
        aggregated.len(),
        level
    );
    aggregated
}

/// Regroup periods in the host's local time zone.
pub fn aggregate_durations(
    periods: &[DayNightPeriod],
    level: DurationLevel,
) -> Vec<AggregatedDurationData> {
    aggregate_durations_in(periods, level, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::SunPhase;
    use chrono::Utc;

    const HOUR: i64 = 3_600_000;
    const JAN_5_UTC: i64 = 1_704_412_800_000;

    fn point(timestamp: i64, phase: SunPhase) -> WeatherDataPoint {
        WeatherDataPoint {
            timestamp,
            temperature: 0.0,
            humidity: 0.0,
            lux: 0.0,
            aqi_ppm: 0.0,
            pressure: None,
            precipitation: "Unknown".to_string(),
            air_quality: "Unknown".to_string(),
            rain_analog: None,
            precipitation_intensity: None,
            sunrise_sunset: phase,
        }
    }

    #[test]
    fn test_segment_alternating_phases() {
        use SunPhase::*;
        let points: Vec<WeatherDataPoint> = [Sunrise, Sunrise, Sunset, Sunset, Sunrise]
            .into_iter()
            .enumerate()
            .map(|(i, phase)| point(i as i64 * 10, phase))
            .collect();

        assert_eq!(
            segment(&points),
            vec![
                DayNightPeriod::new(PeriodKind::Day, 0, 20),
                DayNightPeriod::new(PeriodKind::Night, 20, 40),
                DayNightPeriod::new(PeriodKind::Day, 40, 40),
            ]
        );
    }

    #[test]
    fn test_segment_single_point_has_zero_duration() {
        let periods = segment(&[point(5, SunPhase::Sunset)]);
        assert_eq!(periods, vec![DayNightPeriod::new(PeriodKind::Night, 5, 5)]);
        assert_eq!(periods[0].duration, 0);
    }

    #[test]
    fn test_segment_uniform_series_is_one_period() {
        let points: Vec<_> = (0..4).map(|i| point(i * HOUR, SunPhase::Sunrise)).collect();
        assert_eq!(
            segment(&points),
            vec![DayNightPeriod::new(PeriodKind::Day, 0, 3 * HOUR)]
        );
    }

    #[test]
    fn test_aggregate_durations_monthly() {
        let periods = vec![
            DayNightPeriod::new(PeriodKind::Night, JAN_5_UTC, JAN_5_UTC + 7 * HOUR),
            DayNightPeriod::new(PeriodKind::Day, JAN_5_UTC + 7 * HOUR, JAN_5_UTC + 17 * HOUR),
            DayNightPeriod::new(PeriodKind::Night, JAN_5_UTC + 17 * HOUR, JAN_5_UTC + 31 * HOUR),
            DayNightPeriod::new(PeriodKind::Day, JAN_5_UTC + 31 * HOUR, JAN_5_UTC + 43 * HOUR),
        ];

        let monthly = aggregate_durations_in(&periods, DurationLevel::Monthly, &Utc);

        assert_eq!(monthly.len(), 1);
        let jan = &monthly[0];
        assert_eq!(jan.period_label, "Jan 2024");
        assert_eq!(jan.period_start, JAN_5_UTC);
        assert_eq!(jan.day_count, 2);
        assert_eq!(jan.night_count, 2);
        assert_eq!(jan.avg_day_duration, Some(11.0 * HOUR as f64));
        assert_eq!(jan.avg_night_duration, Some(10.5 * HOUR as f64));
    }

    #[test]
    fn test_aggregate_durations_groups_sorted_and_missing_kind_is_none() {
        let feb = JAN_5_UTC + 31 * 24 * HOUR;
        let periods = vec![
            DayNightPeriod::new(PeriodKind::Day, feb, feb + HOUR),
            DayNightPeriod::new(PeriodKind::Night, JAN_5_UTC, JAN_5_UTC + HOUR),
        ];

        let annual = aggregate_durations_in(&periods, DurationLevel::Annually, &Utc);
        assert_eq!(annual.len(), 1);
        assert_eq!(annual[0].period_label, "2024");

        let monthly = aggregate_durations_in(&periods, DurationLevel::Monthly, &Utc);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].period_label, "Jan 2024");
        assert_eq!(monthly[0].avg_day_duration, None);
        assert_eq!(monthly[1].period_label, "Feb 2024");
        assert_eq!(monthly[1].avg_night_duration, None);
        assert_eq!(monthly[1].day_count, 1);
    }

    #[test]
    fn test_aggregate_durations_weekly_label() {
        let periods = vec![DayNightPeriod::new(PeriodKind::Day, JAN_5_UTC, JAN_5_UTC + HOUR)];
        let weekly = aggregate_durations_in(&periods, DurationLevel::Weekly, &Utc);
        assert_eq!(weekly[0].period_label, "Week 1, 2024");
    }
}
