//! Trades and positions.

use std::sync::Arc;

use super::bar::BarSeries;
use super::cost::CostModel;
use super::error::AnalysisError;
use super::num::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn opposite(self) -> Self {
        match self {
            TradeSide::Buy => TradeSide::Sell,
            TradeSide::Sell => TradeSide::Buy,
        }
    }
}

/// A single execution at a bar index.
///
/// `net_price` folds the per-unit transaction cost into the price: a buy
/// pays more, a sell receives less.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade<N> {
    index: usize,
    side: TradeSide,
    price_per_asset: N,
    amount: Option<N>,
    cost: N,
    net_price: N,
}

impl<N: Num> Trade<N> {
    /// `amount` of `None` means unspecified and counts as one unit.
    pub fn new(
        index: usize,
        side: TradeSide,
        price_per_asset: N,
        amount: Option<N>,
        cost_model: &dyn CostModel<N>,
    ) -> Self {
        let units = amount.unwrap_or_else(N::one);
        let cost = cost_model.trade_cost(price_per_asset, units);
        let cost_per_asset = if units.is_zero() {
            N::zero()
        } else {
            cost / units
        };
        let net_price = match side {
            TradeSide::Buy => price_per_asset + cost_per_asset,
            TradeSide::Sell => price_per_asset - cost_per_asset,
        };
        Trade {
            index,
            side,
            price_per_asset,
            amount,
            cost,
            net_price,
        }
    }

    /// A trade priced at the close of bar `index`.
    pub fn at_close(
        series: &BarSeries<N>,
        index: usize,
        side: TradeSide,
        amount: Option<N>,
        cost_model: &dyn CostModel<N>,
    ) -> Result<Self, AnalysisError> {
        series.check_index(index)?;
        Ok(Trade::new(
            index,
            side,
            series.close_price(index),
            amount,
            cost_model,
        ))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn price_per_asset(&self) -> N {
        self.price_per_asset
    }

    /// The traded amount, one unit when unspecified.
    pub fn amount(&self) -> N {
        self.amount.unwrap_or_else(N::one)
    }

    pub fn is_amount_specified(&self) -> bool {
        self.amount.is_some()
    }

    pub fn cost(&self) -> N {
        self.cost
    }

    pub fn net_price(&self) -> N {
        self.net_price
    }

    /// `price_per_asset * amount`
    pub fn value(&self) -> N {
        self.price_per_asset * self.amount()
    }
}

/// An entry trade with an optional exit. Closed iff the exit is present.
#[derive(Debug, Clone)]
pub struct Position<N: Num> {
    entry: Trade<N>,
    exit: Option<Trade<N>>,
    transaction_cost_model: Arc<dyn CostModel<N>>,
    holding_cost_model: Arc<dyn CostModel<N>>,
}

impl<N: Num> Position<N> {
    pub fn open(
        side: TradeSide,
        index: usize,
        price: N,
        amount: Option<N>,
        transaction_cost_model: Arc<dyn CostModel<N>>,
        holding_cost_model: Arc<dyn CostModel<N>>,
    ) -> Self {
        let entry = Trade::new(index, side, price, amount, transaction_cost_model.as_ref());
        Position {
            entry,
            exit: None,
            transaction_cost_model,
            holding_cost_model,
        }
    }

    /// Close with the same amount as the entry.
    pub fn close(&mut self, index: usize, price: N) -> Result<(), AnalysisError> {
        if self.exit.is_some() {
            return Err(AnalysisError::NoOpenPosition { index });
        }
        if index < self.entry.index {
            return Err(AnalysisError::ExitBeforeEntry {
                index,
                entry_index: self.entry.index,
            });
        }
        self.exit = Some(Trade::new(
            index,
            self.entry.side.opposite(),
            price,
            self.entry.amount,
            self.transaction_cost_model.as_ref(),
        ));
        Ok(())
    }

    pub fn entry(&self) -> &Trade<N> {
        &self.entry
    }

    pub fn exit(&self) -> Option<&Trade<N>> {
        self.exit.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    pub fn is_opened(&self) -> bool {
        !self.is_closed()
    }


    /// Carrying cost accrued from entry up to `final_index`.
    pub fn holding_cost(&self, final_index: usize) -> N {
        self.holding_cost_model.holding_cost(self, final_index)
    }

    /// Profit before any cost; zero while open.
    pub fn gross_profit(&self) -> N {
        match &self.exit {
            None => N::zero(),
            Some(exit) => {
                let diff = exit.value() - self.entry.value();
                if self.entry.is_buy() { diff } else { -diff }
            }
        }
    }

    /// Entry and exit trade costs; entry cost only while open.
    pub fn transaction_cost(&self) -> N {
        match &self.exit {
            None => self.entry.cost,
            Some(exit) => self.entry.cost + exit.cost,
        }
    }

    /// Trade costs plus holding cost up to the exit; entry cost only while open.
    pub fn position_cost(&self) -> N {
        match &self.exit {
            None => self.entry.cost,
            Some(exit) => self.transaction_cost() + self.holding_cost(exit.index),
        }
    }

    /// Profit net of trade and holding costs; zero while open.
    pub fn profit(&self) -> N {
        if self.is_opened() {
            return N::zero();
        }
        self.gross_profit() - self.position_cost()
    }

    pub fn has_profit(&self) -> bool {
        self.profit().is_positive()
    }

    pub fn has_loss(&self) -> bool {
        self.profit() < N::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cost::{LinearTransactionCost, ZeroCost};

    fn zero() -> Arc<dyn CostModel<f64>> {
        Arc::new(ZeroCost)
    }

    fn sample_long() -> Position<f64> {
        let mut pos = Position::open(TradeSide::Buy, 1, 50.0, Some(100.0), zero(), zero());
        pos.close(4, 55.0).unwrap();
        pos
    }

    fn sample_short() -> Position<f64> {
        let mut pos = Position::open(TradeSide::Sell, 1, 100.0, Some(10.0), zero(), zero());
        pos.close(3, 90.0).unwrap();
        pos
    }

    #[test]
    fn unspecified_amount_is_one_unit() {
        let trade = Trade::new(0, TradeSide::Buy, 20.0, None, &ZeroCost);
        assert!(!trade.is_amount_specified());
        assert!((trade.amount() - 1.0).abs() < f64::EPSILON);
        assert!((trade.value() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn net_price_includes_cost() {
        let model = LinearTransactionCost::new(0.01);
        let buy = Trade::new(0, TradeSide::Buy, 100.0, Some(2.0), &model);
        assert!((buy.cost() - 2.0).abs() < 1e-12);
        assert!((buy.net_price() - 101.0).abs() < 1e-12);

        let sell = Trade::new(0, TradeSide::Sell, 100.0, Some(2.0), &model);
        assert!((sell.net_price() - 99.0).abs() < 1e-12);
    }

    #[test]
    fn long_profit() {
        let pos = sample_long();
        assert!(pos.is_closed());
        assert!((pos.gross_profit() - 500.0).abs() < 1e-9);
        assert!((pos.profit() - 500.0).abs() < 1e-9);
        assert!(pos.has_profit());
    }

    #[test]
    fn short_profit() {
        let pos = sample_short();
        assert!((pos.gross_profit() - 100.0).abs() < 1e-9);
        assert!(!pos.has_loss());
    }

    #[test]
    fn net_profit_deducts_costs() {
        let fee: Arc<dyn CostModel<f64>> = Arc::new(LinearTransactionCost::new(0.01));
        let mut pos = Position::open(TradeSide::Buy, 0, 100.0, Some(1.0), fee, zero());
        pos.close(2, 110.0).unwrap();
        // 1.0 at entry, 1.1 at exit
        assert!((pos.profit() - 7.9).abs() < 1e-9);
        assert!((pos.gross_profit() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn open_position_has_no_profit() {
        let pos = Position::open(TradeSide::Buy, 0, 10.0, None, zero(), zero());
        assert!(pos.is_opened());
        assert!(pos.gross_profit().abs() < f64::EPSILON);
        assert!(pos.profit().abs() < f64::EPSILON);
    }

    #[test]
    fn close_before_entry_rejected() {
        let mut pos = Position::open(TradeSide::Buy, 5, 10.0, None, zero(), zero());
        assert!(matches!(
            pos.close(3, 11.0),
            Err(AnalysisError::ExitBeforeEntry {
                index: 3,
                entry_index: 5
            })
        ));
    }

    #[test]
    fn double_close_rejected() {
        let mut pos = sample_long();
        assert!(pos.close(6, 60.0).is_err());
    }

    #[test]
    fn exit_mirrors_entry_side() {
        let pos = sample_short();
        assert_eq!(pos.exit().unwrap().side(), TradeSide::Buy);
        assert_eq!(TradeSide::Buy.opposite(), TradeSide::Sell);
    }
}
