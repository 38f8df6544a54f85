//! Dense, index-aligned value storage for the curve builders.
//!
//! Writes past the end fill the gap first, so the series stays dense and
//! never shrinks. Gaps repeat the last value unless a fixed gap value is set.

use crate::domain::num::Num;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSeries<N> {
    values: Vec<N>,
    gap_value: Option<N>,
}

impl<N: Num> ValueSeries<N> {
    /// Starts as `[initial]`; gaps repeat the last known value.
    pub fn repeating(initial: N) -> Self {
        ValueSeries {
            values: vec![initial],
            gap_value: None,
        }
    }

    /// Starts as `[initial]`; gaps are filled with `gap_value`.
    pub fn with_gap_value(initial: N, gap_value: N) -> Self {
        ValueSeries {
            values: vec![initial],
            gap_value: Some(gap_value),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<N> {
        self.values.get(index).copied()
    }

    /// # Panics
    ///
    /// Panics if `index` has not been written or filled yet.
    pub fn value_at(&self, index: usize) -> N {
        self.values[index]
    }

    pub fn last(&self) -> N {
        // never empty: constructed with an initial value and never truncated
        self.values[self.values.len() - 1]
    }

    pub fn as_slice(&self) -> &[N] {
        &self.values
    }

    /// Grow to at least `len` entries by filling the gap.
    pub fn ensure_len(&mut self, len: usize) {
        if len <= self.values.len() {
            return;
        }
        let fill = self.gap_value.unwrap_or_else(|| self.last());
        self.values.resize(len, fill);
    }

    /// Write `value` at `index`, filling any gap before it.
    pub fn set(&mut self, index: usize, value: N) {
        self.ensure_len(index);
        if index < self.values.len() {
            self.values[index] = value;
        } else {
            self.values.push(value);
        }
    }

    /// Fill through `end_index` inclusive.
    pub fn fill_to(&mut self, end_index: usize) {
        self.ensure_len(end_index + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_initial_value() {
        let series = ValueSeries::repeating(1.0);
        assert_eq!(series.len(), 1);
        assert!(!series.is_empty());
        assert_eq!(series.get(0), Some(1.0));
        assert_eq!(series.get(1), None);
    }

    #[test]
    fn set_past_end_repeats_last_value() {
        let mut series = ValueSeries::repeating(1.0);
        series.set(1, 2.0);
        series.set(4, 3.0);
        assert_eq!(series.as_slice(), &[1.0, 2.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn gap_value_fills_instead_of_repeating() {
        let mut series = ValueSeries::with_gap_value(0.0, 0.0);
        series.set(1, 0.5);
        series.set(3, 0.25);
        series.fill_to(5);
        assert_eq!(series.as_slice(), &[0.0, 0.5, 0.0, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn set_inside_overwrites() {
        let mut series = ValueSeries::repeating(1.0);
        series.fill_to(3);
        series.set(2, 5.0);
        assert_eq!(series.as_slice(), &[1.0, 1.0, 5.0, 1.0]);
    }

    #[test]
    fn never_shrinks() {
        let mut series = ValueSeries::repeating(1.0);
        series.fill_to(4);
        series.fill_to(2);
        series.ensure_len(1);
        assert_eq!(series.len(), 5);
        assert!((series.last() - 1.0).abs() < f64::EPSILON);
    }
}
