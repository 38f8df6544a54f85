//! Per-bar performance curves derived from a trading record.
//!
//! Every curve builder implements [`PerformanceIndicator`]: it knows how to
//! fold one position into its value series, and [`calculate`] drives it over
//! a whole record with the shared open-position policy.

pub mod cash_flow;
pub mod cumulative_pnl;
pub mod excess_returns;
pub mod frequency;
pub mod returns;
pub mod sample_summary;
pub mod value_series;

use std::fmt;
use std::str::FromStr;

use super::num::Num;
use super::position::{Position, Trade};
use super::trading_record::TradingRecord;

/// Whether open positions drift with the market or stay frozen until exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquityCurveMode {
    #[default]
    MarkToMarket,
    Realized,
}

/// Caller-requested treatment of the trailing open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenPositionHandling {
    #[default]
    MarkToMarket,
    Ignore,
}

impl fmt::Display for EquityCurveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquityCurveMode::MarkToMarket => write!(f, "mark_to_market"),
            EquityCurveMode::Realized => write!(f, "realized"),
        }
    }
}

impl FromStr for EquityCurveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mark_to_market" => Ok(EquityCurveMode::MarkToMarket),
            "realized" => Ok(EquityCurveMode::Realized),
            other => Err(format!("unknown equity curve mode '{other}'")),
        }
    }
}

impl fmt::Display for OpenPositionHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenPositionHandling::MarkToMarket => write!(f, "mark_to_market"),
            OpenPositionHandling::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for OpenPositionHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mark_to_market" => Ok(OpenPositionHandling::MarkToMarket),
            "ignore" => Ok(OpenPositionHandling::Ignore),
            other => Err(format!("unknown open position handling '{other}'")),
        }
    }
}

/// A realized curve never includes unrealized P&L, whatever the caller asked for.
pub fn effective_open_position_handling(
    mode: EquityCurveMode,
    requested: OpenPositionHandling,
) -> OpenPositionHandling {
    match mode {
        EquityCurveMode::Realized => OpenPositionHandling::Ignore,
        EquityCurveMode::MarkToMarket => requested,
    }
}

/// Options shared by the curve builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurveOptions {
    /// Last index considered for open positions; the record's end index when `None`.
    pub final_index: Option<usize>,
    pub mode: EquityCurveMode,
    pub open_position_handling: OpenPositionHandling,
}

impl CurveOptions {
    pub fn with_final_index(mut self, final_index: usize) -> Self {
        self.final_index = Some(final_index);
        self
    }

    pub fn with_mode(mut self, mode: EquityCurveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_open_position_handling(mut self, handling: OpenPositionHandling) -> Self {
        self.open_position_handling = handling;
        self
    }
}

pub trait PerformanceIndicator<N: Num> {
    fn equity_curve_mode(&self) -> EquityCurveMode;

    /// Fold one position into the value series.
    fn calculate_position(&mut self, position: &Position<N>, final_index: usize);

    fn value_at(&self, index: usize) -> N;

    fn size(&self) -> usize;
}

/// Drive `indicator` over every closed position of `record`, then over the
/// trailing open position when the effective handling marks it to market.
pub fn calculate<N, I>(
    indicator: &mut I,
    record: &TradingRecord<N>,
    final_index: usize,
    handling: OpenPositionHandling,
) where
    N: Num,
    I: PerformanceIndicator<N> + ?Sized,
{
    for position in record.positions() {
        indicator.calculate_position(position, final_index);
    }
    let effective = effective_open_position_handling(indicator.equity_curve_mode(), handling);
    if effective == OpenPositionHandling::MarkToMarket {
        if let Some(current) = record.current_position().filter(|p| p.is_opened()) {
            indicator.calculate_position(current, final_index);
        }
    }
}

/// Last index a position contributes to: its exit (if reached by
/// `final_index`) or `final_index`, clamped to the series and never before entry.
pub fn determine_end_index<N: Num>(
    position: &Position<N>,
    final_index: usize,
    series_end_index: usize,
) -> usize {
    let end = match position.exit() {
        Some(exit) => exit.index().min(final_index),
        None => final_index,
    };
    end.min(series_end_index).max(position.entry().index())
}

/// Apply an accrued holding cost to a price so that it always erodes the
/// position's return: longs see a lower price, shorts a higher one.
pub fn add_cost<N: Num>(price: N, cost: N, is_long: bool) -> N {
    if is_long { price - cost } else { price + cost }
}

/// Multiplicative price ratio; shorts mirror it around one.
pub fn price_ratio<N: Num>(is_long: bool, entry_price: N, price: N) -> N {
    let ratio = price / entry_price;
    if is_long {
        ratio
    } else {
        N::from_i64(2) - ratio
    }
}

/// Net price of `position` at bar `index` with the holding cost accrued so far.
pub(crate) struct PricePath<N> {
    pub is_long: bool,
    pub entry_index: usize,
    pub end_index: usize,
    pub net_entry_price: N,
    pub holding_cost: N,
    pub cost_per_period: N,
}

impl<N: Num> PricePath<N> {
    pub fn new(position: &Position<N>, final_index: usize, series_end_index: usize) -> Self {
        let entry_index = position.entry().index();
        let end_index = determine_end_index(position, final_index, series_end_index);
        let holding_cost = position.holding_cost(end_index);
        let periods = (end_index - entry_index).max(1);
        PricePath {
            is_long: position.entry().is_buy(),
            entry_index,
            end_index,
            net_entry_price: position.entry().net_price(),
            holding_cost,
            cost_per_period: holding_cost / N::from_usize(periods),
        }
    }

    /// Net price for an intermediate bar, holding cost accrued pro rata.
    pub fn intermediate(&self, index: usize, close: N) -> N {
        let accrued = self.cost_per_period * N::from_usize(index - self.entry_index);
        add_cost(close, accrued, self.is_long)
    }

    /// Net price at the last bar, full holding cost applied.
    pub fn terminal(&self, price: N) -> N {
        add_cost(price, self.holding_cost, self.is_long)
    }

    /// The exit trade, when the position is closed within the horizon.
    pub fn realized_exit<'p>(&self, position: &'p Position<N>) -> Option<&'p Trade<N>> {
        position.exit().filter(|exit| exit.index() <= self.end_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::TradeSide;

    #[test]
    fn realized_mode_forces_ignore() {
        assert_eq!(
            effective_open_position_handling(
                EquityCurveMode::Realized,
                OpenPositionHandling::MarkToMarket
            ),
            OpenPositionHandling::Ignore
        );
        assert_eq!(
            effective_open_position_handling(
                EquityCurveMode::MarkToMarket,
                OpenPositionHandling::Ignore
            ),
            OpenPositionHandling::Ignore
        );
        assert_eq!(
            effective_open_position_handling(
                EquityCurveMode::MarkToMarket,
                OpenPositionHandling::MarkToMarket
            ),
            OpenPositionHandling::MarkToMarket
        );
    }

    #[test]
    fn end_index_rules() {
        let mut record = TradingRecord::<f64>::new(TradeSide::Buy);
        record.enter(2, 10.0, 1.0).unwrap();
        record.exit(6, 11.0).unwrap();
        let closed = &record.positions()[0];
        assert_eq!(determine_end_index(closed, 9, 9), 6);
        assert_eq!(determine_end_index(closed, 4, 9), 4);
        assert_eq!(determine_end_index(closed, 1, 9), 2);

        record.enter(7, 10.0, 1.0).unwrap();
        let open = record.current_position().unwrap();
        assert_eq!(determine_end_index(open, 20, 9), 9);
    }

    #[test]
    fn cost_erodes_both_sides() {
        assert!((add_cost(100.0, 1.0, true) - 99.0).abs() < f64::EPSILON);
        assert!((add_cost(100.0, 1.0, false) - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_ratio_mirrors_long() {
        assert!((price_ratio(true, 100.0, 110.0) - 1.1).abs() < 1e-12);
        assert!((price_ratio(false, 100.0, 110.0) - 0.9).abs() < 1e-12);
        assert!((price_ratio(false, 100.0, 90.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(
            "Realized".parse::<EquityCurveMode>().unwrap(),
            EquityCurveMode::Realized
        );
        assert_eq!(
            "ignore".parse::<OpenPositionHandling>().unwrap(),
            OpenPositionHandling::Ignore
        );
        assert!("sometimes".parse::<EquityCurveMode>().is_err());
        assert_eq!(EquityCurveMode::MarkToMarket.to_string(), "mark_to_market");
    }

    #[test]
    fn curve_options_builder() {
        let options = CurveOptions::default()
            .with_final_index(3)
            .with_mode(EquityCurveMode::Realized)
            .with_open_position_handling(OpenPositionHandling::Ignore);
        assert_eq!(options.final_index, Some(3));
        assert_eq!(options.mode, EquityCurveMode::Realized);
        assert_eq!(options.open_position_handling, OpenPositionHandling::Ignore);
    }
}
