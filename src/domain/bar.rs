//! OHLCV bars and the index-addressed series the analysis runs over.

use chrono::{DateTime, Duration, Utc};

use super::error::AnalysisError;
use super::num::Num;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar<N> {
    pub end_time: DateTime<Utc>,
    pub time_period: Duration,
    pub open: N,
    pub high: N,
    pub low: N,
    pub close: N,
    pub volume: N,
}

impl<N: Num> Bar<N> {
    /// A bar whose open, high, low and close all equal `close`.
    pub fn flat(end_time: DateTime<Utc>, time_period: Duration, close: N) -> Self {
        Bar {
            end_time,
            time_period,
            open: close,
            high: close,
            low: close,
            close,
            volume: N::one(),
        }
    }

    pub fn begin_time(&self) -> DateTime<Utc> {
        self.end_time - self.time_period
    }
}

/// A non-empty, chronologically ordered run of bars addressed by 0-based index.
#[derive(Debug, Clone)]
pub struct BarSeries<N> {
    name: String,
    bars: Vec<Bar<N>>,
}

impl<N: Num> BarSeries<N> {
    pub fn new(name: impl Into<String>, bars: Vec<Bar<N>>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }
        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].end_time < w[0].end_time)
        {
            return Err(AnalysisError::UnorderedBars { index: index + 1 });
        }
        Ok(BarSeries {
            name: name.into(),
            bars,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn begin_index(&self) -> usize {
        0
    }

    pub fn end_index(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is past the end of the series.
    pub fn bar(&self, index: usize) -> &Bar<N> {
        &self.bars[index]
    }

    pub fn get(&self, index: usize) -> Option<&Bar<N>> {
        self.bars.get(index)
    }

    /// # Panics
    ///
    /// Panics if `index` is past the end of the series.
    pub fn close_price(&self, index: usize) -> N {
        self.bars[index].close
    }

    pub fn bars(&self) -> &[Bar<N>] {
        &self.bars
    }

    pub fn check_index(&self, index: usize) -> Result<(), AnalysisError> {
        if index > self.end_index() {
            return Err(AnalysisError::IndexOutOfRange {
                index,
                end_index: self.end_index(),
            });
        }
        Ok(())
    }
}
