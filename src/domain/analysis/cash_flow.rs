//! Compounding equity curve: the account starts at `1` and every position
//! scales it by the ratio of its net price path.

use tracing::debug;

use super::value_series::ValueSeries;
use super::{
    calculate, price_ratio, CurveOptions, EquityCurveMode, PerformanceIndicator, PricePath,
};
use crate::domain::bar::BarSeries;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

#[derive(Debug, Clone)]
pub struct CashFlow<'a, N: Num> {
    series: &'a BarSeries<N>,
    values: ValueSeries<N>,
    mode: EquityCurveMode,
}

impl<'a, N: Num> CashFlow<'a, N> {
    /// Mark-to-market curve of `record` over the whole series.
    pub fn new(series: &'a BarSeries<N>, record: &TradingRecord<N>) -> Self {
        CashFlow::build(series, record, CurveOptions::default())
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
        let mut cash_flow = CashFlow::empty(series, options.mode);
        calculate(
            &mut cash_flow,
            record,
            final_index,
            options.open_position_handling,
        );
        cash_flow.values.fill_to(series.end_index());
        cash_flow
    }

    /// Curve of a single position; an open one is marked to the series end.
    pub fn from_position(
        series: &'a BarSeries<N>,
        position: &Position<N>,
        mode: EquityCurveMode,
    ) -> Self {
        let final_index = position
            .exit()
            .map_or(series.end_index(), |exit| exit.index());
        let mut cash_flow = CashFlow::empty(series, mode);
        cash_flow.calculate_position(position, final_index);
        cash_flow.values.fill_to(series.end_index());
        cash_flow
    }

    fn empty(series: &'a BarSeries<N>, mode: EquityCurveMode) -> Self {
        CashFlow {
            series,
            values: ValueSeries::repeating(N::one()),
            mode,
        }
    }

    pub fn values(&self) -> &[N] {
        self.values.as_slice()
    }
}

impl<N: Num> PerformanceIndicator<N> for CashFlow<'_, N> {
    fn equity_curve_mode(&self) -> EquityCurveMode {
        self.mode
    }

    fn calculate_position(&mut self, position: &Position<N>, final_index: usize) {
        let entry_index = position.entry().index();
        if entry_index > self.series.end_index() {
            debug!(entry_index, "position starts after the series, skipped");
            return;
        }
        let path = PricePath::new(position, final_index, self.series.end_index());
        let exit = path.realized_exit(position);
        if self.mode == EquityCurveMode::Realized && exit.is_none() {
            return;
        }

        self.values.ensure_len(entry_index + 1);
        let entry_equity = self.values.value_at(entry_index);
        if !entry_equity.is_positive() || path.net_entry_price.is_zero() {
            debug!(
                entry_index,
                equity = ?entry_equity,
                "non-positive equity or zero entry price, position skipped"
            );
            return;
        }

        for i in entry_index + 1..path.end_index {
            let value = match self.mode {
                EquityCurveMode::MarkToMarket => {
                    let net = path.intermediate(i, self.series.close_price(i));
                    entry_equity * price_ratio(path.is_long, path.net_entry_price, net)
                }
                EquityCurveMode::Realized => entry_equity,
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
            entry_equity * price_ratio(path.is_long, path.net_entry_price, net_exit),
        );
    }

    fn value_at(&self, index: usize) -> N {
        self.values.value_at(index)
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}
