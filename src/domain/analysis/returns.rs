//! Bar-to-bar returns of each position's net price path.
//!
//! Bars outside every position earn a return of zero.

use std::fmt;
use std::str::FromStr;

use super::value_series::ValueSeries;
use super::{calculate, price_ratio, CurveOptions, EquityCurveMode, PerformanceIndicator, PricePath};
use crate::domain::bar::BarSeries;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    Arithmetic,
    Log,
}

impl ReturnType {
    /// Turn a gross price ratio into a return.
    pub fn of_ratio<N: Num>(self, ratio: N) -> N {
        match self {
            ReturnType::Arithmetic => ratio - N::one(),
            ReturnType::Log => {
                if ratio.is_positive() {
                    ratio.ln()
                } else {
                    N::zero()
                }
            }
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Arithmetic => write!(f, "arithmetic"),
            ReturnType::Log => write!(f, "log"),
        }
    }
}

impl FromStr for ReturnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arithmetic" => Ok(ReturnType::Arithmetic),
            "log" => Ok(ReturnType::Log),
            other => Err(format!("unknown return type '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Returns<'a, N: Num> {
    series: &'a BarSeries<N>,
    values: ValueSeries<N>,
    return_type: ReturnType,
    mode: EquityCurveMode,
}

impl<'a, N: Num> Returns<'a, N> {
    pub fn new(series: &'a BarSeries<N>, record: &TradingRecord<N>, return_type: ReturnType) -> Self {
        Returns::build(series, record, return_type, CurveOptions::default())
    }

    pub fn build(
        series: &'a BarSeries<N>,
        record: &TradingRecord<N>,
        return_type: ReturnType,
        options: CurveOptions,
    ) -> Self {
        let final_index = options
            .final_index
            .unwrap_or_else(|| record.end_index(series))
            .min(series.end_index());
        let mut returns = Returns {
            series,
            values: ValueSeries::with_gap_value(N::zero(), N::zero()),
            return_type,
            mode: options.mode,
        };
        calculate(&mut returns, record, final_index, options.open_position_handling);
        returns.values.fill_to(series.end_index());
        returns
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    pub fn values(&self) -> &[N] {
        self.values.as_slice()
    }
}

impl<N: Num> PerformanceIndicator<N> for Returns<'_, N> {
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
        if path.net_entry_price.is_zero() || path.end_index == entry_index {
            return;
        }

        let exit_price = match exit {
            Some(exit) => exit.net_price(),
            None => self.series.close_price(path.end_index),
        };
        let net_exit = path.terminal(exit_price);

        if self.mode == EquityCurveMode::Realized {
            let ratio = price_ratio(path.is_long, path.net_entry_price, net_exit);
            self.values.set(path.end_index, self.return_type.of_ratio(ratio));
            return;
        }

        let mut previous = path.net_entry_price;
        for i in entry_index + 1..=path.end_index {
            let net = if i == path.end_index {
                net_exit
            } else {
                path.intermediate(i, self.series.close_price(i))
            };
            let value = if previous.is_zero() {
                N::zero()
            } else {
                self.return_type
                    .of_ratio(price_ratio(path.is_long, previous, net))
            };
            self.values.set(i, value);
            previous = net;
        }
    }

    fn value_at(&self, index: usize) -> N {
        self.values.value_at(index)
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}
