//! Additive equity curve: running profit and loss per unit, starting at zero.

use super::value_series::ValueSeries;
use super::{calculate, CurveOptions, EquityCurveMode, PerformanceIndicator, PricePath};
use crate::domain::bar::BarSeries;
use crate::domain::error::AnalysisError;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

#[derive(Debug, Clone)]
pub struct CumulativePnL<'a, N: Num> {
    series: &'a BarSeries<N>,
    values: ValueSeries<N>,
    mode: EquityCurveMode,
}

impl<'a, N: Num> CumulativePnL<'a, N> {
    pub fn new(series: &'a BarSeries<N>, record: &TradingRecord<N>) -> Self {
        CumulativePnL::build(series, record, CurveOptions::default())
    }

    pub fn build(
        series: &'a BarSeries<N>,
        record: &TradingRecord<N>,
        options: CurveOptions,
    ) -> Self {
        let final_index = options
            .final_index
            .unwrap_or_else(|| record.end_index(series))
            .min(series.end_index());
        let mut pnl = CumulativePnL::empty(series, options.mode);
        calculate(&mut pnl, record, final_index, options.open_position_handling);
        pnl.values.fill_to(series.end_index());
        pnl
    }

    /// Curve of a single closed position.
    ///
    /// An open position has no horizon of its own: use
    /// [`CumulativePnL::from_position_until`] to mark it up to a final index.
    pub fn from_position(
        series: &'a BarSeries<N>,
        position: &Position<N>,
        mode: EquityCurveMode,
    ) -> Result<Self, AnalysisError> {
        let exit = position.exit().ok_or(AnalysisError::OpenPosition)?;
        Ok(CumulativePnL::from_position_until(
            series,
            position,
            exit.index(),
            mode,
        ))
    }

    pub fn from_position_until(
        series: &'a BarSeries<N>,
        position: &Position<N>,
        final_index: usize,
        mode: EquityCurveMode,
    ) -> Self {
        let mut pnl = CumulativePnL::empty(series, mode);
        pnl.calculate_position(position, final_index);
        pnl.values.fill_to(series.end_index());
        pnl
    }

    fn empty(series: &'a BarSeries<N>, mode: EquityCurveMode) -> Self {
        CumulativePnL {
            series,
            values: ValueSeries::repeating(N::zero()),
            mode,
        }
    }

    pub fn values(&self) -> &[N] {
        self.values.as_slice()
    }
}

fn delta<N: Num>(is_long: bool, net_entry: N, net_price: N) -> N {
    if is_long {
        net_price - net_entry
    } else {
        net_entry - net_price
    }
}

impl<N: Num> PerformanceIndicator<N> for CumulativePnL<'_, N> {
    fn equity_curve_mode(&self) -> EquityCurveMode {
        self.mode
    }

    fn calculate_position(&mut self, position: &Position<N>, final_index: usize) {
        let entry_index = position.entry().index();
        if entry_index > self.series.end_index() {
            return;
        }
        let path = PricePath::new(position, final_index, self.series.end_index());
        let exit = path.realized_exit(position);
        if self.mode == EquityCurveMode::Realized && exit.is_none() {
            return;
        }

        self.values.ensure_len(entry_index + 1);
        let base = self.values.value_at(entry_index);

        for i in entry_index + 1..path.end_index {
            let value = match self.mode {
                EquityCurveMode::MarkToMarket => {
                    let net = path.intermediate(i, self.series.close_price(i));
                    base + delta(path.is_long, path.net_entry_price, net)
                }
                EquityCurveMode::Realized => base,
            };
            self.values.set(i, value);
        }

        let exit_price = match exit {
            Some(exit) => exit.net_price(),
            None => self.series.close_price(path.end_index),
        };
        let net_exit = path.terminal(exit_price);
        self.values.set(
            path.end_index,
            base + delta(path.is_long, path.net_entry_price, net_exit),
        );
    }

    fn value_at(&self, index: usize) -> N {
        self.values.value_at(index)
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}
