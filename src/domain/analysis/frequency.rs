//! Calendar sampling of a bar series.
//!
//! A series is cut into consecutive `(previous, current]` index pairs, one per
//! calendar period in the grouping time zone. The last bar of each period
//! closes a sample; the trailing, possibly partial, period is always emitted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Offset, Timelike, Utc};
use chrono_tz::Tz;

use crate::domain::bar::BarSeries;
use crate::domain::num::Num;

/// Mean Gregorian year.
pub const SECONDS_PER_YEAR: f64 = 365.2425 * 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingFrequency {
    #[default]
    Bar,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl SamplingFrequency {
    /// Calendar bucket of `time` in `zone`; `None` when every bar is its own sample.
    ///
    /// Hourly buckets carry the UTC offset so the repeated local hour of a
    /// daylight-saving fall-back stays two buckets.
    fn period_key(self, time: DateTime<Utc>, zone: Tz) -> Option<(i32, u32, u32, i32)> {
        let local = time.with_timezone(&zone);
        match self {
            SamplingFrequency::Bar => None,
            SamplingFrequency::Hour => Some((
                local.year(),
                local.ordinal(),
                local.hour(),
                local.offset().fix().local_minus_utc(),
            )),
            SamplingFrequency::Day => Some((local.year(), local.ordinal(), 0, 0)),
            SamplingFrequency::Week => {
                let week = local.iso_week();
                Some((week.year(), week.week(), 0, 0))
            }
            SamplingFrequency::Month => Some((local.year(), local.month(), 0, 0)),
            SamplingFrequency::Quarter => Some((local.year(), (local.month() - 1) / 3, 0, 0)),
            SamplingFrequency::Year => Some((local.year(), 0, 0, 0)),
        }
    }

    fn same_period(self, a: DateTime<Utc>, b: DateTime<Utc>, zone: Tz) -> bool {
        match (self.period_key(a, zone), self.period_key(b, zone)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

impl fmt::Display for SamplingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplingFrequency::Bar => "bar",
            SamplingFrequency::Hour => "hour",
            SamplingFrequency::Day => "day",
            SamplingFrequency::Week => "week",
            SamplingFrequency::Month => "month",
            SamplingFrequency::Quarter => "quarter",
            SamplingFrequency::Year => "year",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SamplingFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(SamplingFrequency::Bar),
            "hour" | "hourly" => Ok(SamplingFrequency::Hour),
            "day" | "daily" => Ok(SamplingFrequency::Day),
            "week" | "weekly" => Ok(SamplingFrequency::Week),
            "month" | "monthly" => Ok(SamplingFrequency::Month),
            "quarter" | "quarterly" => Ok(SamplingFrequency::Quarter),
            "year" | "yearly" => Ok(SamplingFrequency::Year),
            other => Err(format!("unknown sampling frequency '{other}'")),
        }
    }
}

/// One sample interval: `(previous, current]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPair {
    pub previous: usize,
    pub current: usize,
}

/// One excess-return observation and the time it spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<N> {
    pub excess_return: N,
    pub period_years: f64,
}

/// Lazy, single-pass walk over the sample boundaries of a series.
pub struct SamplingFrequencyIndexes<'a, N> {
    series: &'a BarSeries<N>,
    frequency: SamplingFrequency,
    zone: Tz,
    previous: usize,
    next: usize,
    end: usize,
}

impl<'a, N: Num> SamplingFrequencyIndexes<'a, N> {
    /// Pairs covering `[start, end]`, the first anchored at `anchor`.
    pub fn new(
        series: &'a BarSeries<N>,
        frequency: SamplingFrequency,
        zone: Tz,
        anchor: usize,
        start: usize,
        end: usize,
    ) -> Self {
        SamplingFrequencyIndexes {
            series,
            frequency,
            zone,
            previous: anchor,
            next: start,
            end: end.min(series.end_index()),
        }
    }

    /// Pairs over the whole series, anchored at its first bar.
    pub fn over(series: &'a BarSeries<N>, frequency: SamplingFrequency, zone: Tz) -> Self {
        let begin = series.begin_index();
        SamplingFrequencyIndexes::new(series, frequency, zone, begin, begin + 1, series.end_index())
    }

    fn is_boundary(&self, index: usize) -> bool {
        if index >= self.end || self.frequency == SamplingFrequency::Bar {
            return true;
        }
        let here = self.series.bar(index).end_time;
        let after = self.series.bar(index + 1).end_time;
        !self.frequency.same_period(here, after, self.zone)
    }
}

impl<N: Num> Iterator for SamplingFrequencyIndexes<'_, N> {
    type Item = IndexPair;

    fn next(&mut self) -> Option<IndexPair> {
        while self.next <= self.end {
            let index = self.next;
            self.next += 1;
            if self.is_boundary(index) {
                let pair = IndexPair {
                    previous: self.previous,
                    current: index,
                };
                self.previous = index;
                return Some(pair);
            }
        }
        None
    }
}

/// Elapsed time between the end times of two bars, in mean years.
pub fn delta_years<N: Num>(series: &BarSeries<N>, previous: usize, current: usize) -> f64 {
    let elapsed = series.bar(current).end_time - series.bar(previous).end_time;
    elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn series_at(times: &[DateTime<Utc>]) -> BarSeries<f64> {
        let bars = times
            .iter()
            .map(|&t| Bar::flat(t, Duration::hours(1), 1.0))
            .collect();
        BarSeries::new("sampling", bars).unwrap()
    }

    fn pairs(series: &BarSeries<f64>, frequency: SamplingFrequency, zone: Tz) -> Vec<(usize, usize)> {
        SamplingFrequencyIndexes::over(series, frequency, zone)
            .map(|p| (p.previous, p.current))
            .collect()
    }

    #[test]
    fn bar_frequency_pairs_every_bar() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let times: Vec<_> = (0..4).map(|i| start + Duration::days(i)).collect();
        let s = series_at(&times);
        assert_eq!(
            pairs(&s, SamplingFrequency::Bar, Tz::UTC),
            vec![(0, 1), (1, 2), (2, 3)]
        );
    }

    #[test]
    fn daily_grouping_collapses_intraday_bars() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let times = [
            start,
            start + Duration::hours(1),
            start + Duration::hours(2),
            start + Duration::days(1),
            start + Duration::days(1) + Duration::hours(1),
            start + Duration::days(2),
        ];
        let s = series_at(&times);
        assert_eq!(
            pairs(&s, SamplingFrequency::Day, Tz::UTC),
            vec![(0, 2), (2, 4), (4, 5)]
        );
    }

    #[test]
    fn same_day_hourly_bars_make_one_sample() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let times: Vec<_> = (0..5).map(|i| start + Duration::hours(i)).collect();
        let s = series_at(&times);
        assert_eq!(pairs(&s, SamplingFrequency::Day, Tz::UTC), vec![(0, 4)]);
    }

    #[test]
    fn grouping_respects_time_zone() {
        // 03:00 and 05:00 UTC fall on different New York days
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap();
        let times = [
            first - Duration::hours(2),
            first,
            first + Duration::hours(2),
            first + Duration::hours(3),
        ];
        let s = series_at(&times);
        assert_eq!(
            pairs(&s, SamplingFrequency::Day, Tz::UTC),
            vec![(0, 3)]
        );
        assert_eq!(
            pairs(&s, SamplingFrequency::Day, chrono_tz::America::New_York),
            vec![(0, 1), (1, 3)]
        );
    }

    #[test]
    fn hourly_grouping_keeps_repeated_fall_back_hour_apart() {
        // 05:00Z and 06:00Z are both 01:00 in New York on 2024-11-03 (EDT, then EST)
        let first = Utc.with_ymd_and_hms(2024, 11, 3, 5, 0, 0).unwrap();
        let times: Vec<_> = (0..4).map(|i| first + Duration::minutes(30 * i)).collect();
        let s = series_at(&times);
        assert_eq!(
            pairs(&s, SamplingFrequency::Hour, chrono_tz::America::New_York),
            vec![(0, 1), (1, 3)]
        );
        assert_eq!(pairs(&s, SamplingFrequency::Hour, Tz::UTC), vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn monthly_and_quarterly_grouping() {
        let times: Vec<_> = [(1, 15), (1, 31), (2, 10), (3, 31), (4, 1), (4, 2)]
            .iter()
            .map(|&(m, d)| Utc.with_ymd_and_hms(2024, m, d, 0, 0, 0).unwrap())
            .collect();
        let s = series_at(&times);
        assert_eq!(
            pairs(&s, SamplingFrequency::Month, Tz::UTC),
            vec![(0, 1), (1, 2), (2, 3), (3, 5)]
        );
        assert_eq!(
            pairs(&s, SamplingFrequency::Quarter, Tz::UTC),
            vec![(0, 3), (3, 5)]
        );
    }

    #[test]
    fn single_bar_has_no_samples() {
        let s = series_at(&[Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()]);
        assert!(pairs(&s, SamplingFrequency::Bar, Tz::UTC).is_empty());
    }

    #[test]
    fn delta_years_uses_mean_year() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let s = series_at(&[start, start + Duration::days(1)]);
        assert_relative_eq!(delta_years(&s, 0, 1), 1.0 / 365.2425, epsilon = 1e-15);
    }

    #[test]
    fn frequency_parsing() {
        assert_eq!("Daily".parse::<SamplingFrequency>().unwrap(), SamplingFrequency::Day);
        assert_eq!("week".parse::<SamplingFrequency>().unwrap(), SamplingFrequency::Week);
        assert!("fortnight".parse::<SamplingFrequency>().is_err());
        assert_eq!(SamplingFrequency::Quarter.to_string(), "quarter");
    }
}
