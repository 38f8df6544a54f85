//! CSV file data adapter.
//!
//! One file per series, `<name>.csv`, with the header
//! `end_time,open,high,low,close,volume` and RFC 3339 end times.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::AnalysisError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Row {
    end_time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", name))
    }

    fn column<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, AnalysisError> {
        record.get(index).ok_or_else(|| AnalysisError::Data {
            reason: format!("missing {} column", name),
        })
    }

    fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, AnalysisError> {
        Self::column(record, index, name)?
            .trim()
            .parse()
            .map_err(|e| AnalysisError::Data {
                reason: format!("invalid {} value: {}", name, e),
            })
    }

    fn parse_row(record: &csv::StringRecord) -> Result<Row, AnalysisError> {
        let end_time = DateTime::parse_from_rfc3339(Self::column(record, 0, "end_time")?.trim())
            .map_err(|e| AnalysisError::Data {
                reason: format!("invalid end_time: {}", e),
            })?
            .with_timezone(&Utc);
        Ok(Row {
            end_time,
            open: Self::number(record, 1, "open")?,
            high: Self::number(record, 2, "high")?,
            low: Self::number(record, 3, "low")?,
            close: Self::number(record, 4, "close")?,
            volume: Self::number(record, 5, "volume")?,
        })
    }
}

/// Period of bar `i`: the gap to the previous bar, or to the next one for the
/// first bar. A lone bar is taken to span one day.
fn infer_period(rows: &[Row], i: usize) -> Duration {
    let gap = if i > 0 {
        Some(rows[i].end_time - rows[i - 1].end_time)
    } else {
        rows.get(1).map(|next| next.end_time - rows[0].end_time)
    };
    gap.filter(|d| *d > Duration::zero())
        .unwrap_or_else(|| Duration::days(1))
}

impl DataPort for CsvAdapter {
    fn load_series(&self, name: &str) -> Result<BarSeries<f64>, AnalysisError> {
        let path = self.csv_path(name);
        let content = fs::read_to_string(&path).map_err(|e| AnalysisError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| AnalysisError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            rows.push(Self::parse_row(&record)?);
        }
        rows.sort_by_key(|r| r.end_time);
        debug!(series = name, bars = rows.len(), "loaded bar series");

        let bars = (0..rows.len())
            .map(|i| {
                let row = &rows[i];
                Bar {
                    end_time: row.end_time,
                    time_period: infer_period(&rows, i),
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume,
                }
            })
            .collect();
        BarSeries::new(name, bars)
    }

    fn list_series(&self) -> Result<Vec<String>, AnalysisError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
