#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use perfcurve::domain::bar::{Bar, BarSeries};
use perfcurve::domain::error::AnalysisError;
use perfcurve::domain::num::Num;
use perfcurve::domain::trading_record::TradingRecord;
use perfcurve::ports::data_port::DataPort;
use std::collections::HashMap;

pub const CLOSES: [f64; 6] = [100.0, 110.0, 105.0, 120.0, 115.0, 130.0];

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// One flat bar per `step`, starting at [`start`].
pub fn series_with_step<N: Num>(closes: &[f64], step: Duration) -> BarSeries<N> {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::flat(start() + step * i as i32, step, N::from_f64(c)))
        .collect();
    BarSeries::new("fixture", bars).unwrap()
}

pub fn daily_series<N: Num>(closes: &[f64]) -> BarSeries<N> {
    series_with_step(closes, Duration::days(1))
}

/// Long from the first bar to the last.
pub fn buy_and_hold<N: Num>(series: &BarSeries<N>) -> TradingRecord<N> {
    let mut record = TradingRecord::default();
    let end = series.end_index();
    record.enter(0, series.close_price(0), N::one()).unwrap();
    record.exit(end, series.close_price(end)).unwrap();
    record
}

/// Back-to-back longs, each exiting on the bar the next one enters.
pub fn always_invested<N: Num>(series: &BarSeries<N>, cuts: &[usize]) -> TradingRecord<N> {
    let mut record = TradingRecord::default();
    let mut points = vec![0];
    points.extend_from_slice(cuts);
    points.push(series.end_index());
    for pair in points.windows(2) {
        record
            .enter(pair[0], series.close_price(pair[0]), N::one())
            .unwrap();
        record.exit(pair[1], series.close_price(pair[1])).unwrap();
    }
    record
}

pub struct MockDataPort {
    pub data: HashMap<String, BarSeries<f64>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, name: &str, series: BarSeries<f64>) -> Self {
        self.data.insert(name.to_string(), series);
        self
    }

    pub fn with_error(mut self, name: &str, reason: &str) -> Self {
        self.errors.insert(name.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self, name: &str) -> Result<BarSeries<f64>, AnalysisError> {
        if let Some(reason) = self.errors.get(name) {
            return Err(AnalysisError::Data {
                reason: reason.clone(),
            });
        }
        self.data.get(name).cloned().ok_or(AnalysisError::Data {
            reason: format!("unknown series {name}"),
        })
    }

    fn list_series(&self) -> Result<Vec<String>, AnalysisError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
