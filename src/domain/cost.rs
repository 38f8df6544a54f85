//! Transaction and holding cost models.
//!
//! One trait covers both concerns: a position keeps one model for the
//! cost of each trade and another for the carrying cost accrued while held.

use std::fmt::Debug;

use super::num::Num;
use super::position::{Position, TradeSide};

pub trait CostModel<N: Num>: Debug + Send + Sync {
    /// Cost of executing a single trade of `amount` units at `price`.
    fn trade_cost(&self, price: N, amount: N) -> N;

    /// Carrying cost of `position` accrued from its entry up to `final_index`.
    fn holding_cost(&self, position: &Position<N>, final_index: usize) -> N;
}

/// No cost at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZeroCost;

impl<N: Num> CostModel<N> for ZeroCost {
    fn trade_cost(&self, _price: N, _amount: N) -> N {
        N::zero()
    }

    fn holding_cost(&self, _position: &Position<N>, _final_index: usize) -> N {
        N::zero()
    }
}

/// Fee proportional to the traded value: `price * amount * fee_per_trade`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransactionCost {
    pub fee_per_trade: f64,
}

impl LinearTransactionCost {
    pub fn new(fee_per_trade: f64) -> Self {
        LinearTransactionCost { fee_per_trade }
    }
}

impl<N: Num> CostModel<N> for LinearTransactionCost {
    fn trade_cost(&self, price: N, amount: N) -> N {
        price * amount * N::from_f64(self.fee_per_trade)
    }

    fn holding_cost(&self, _position: &Position<N>, _final_index: usize) -> N {
        N::zero()
    }
}

/// Borrowing fee charged on short positions for every bar held:
/// `entry value * fee_per_period * bars`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearBorrowingCost {
    pub fee_per_period: f64,
}

impl LinearBorrowingCost {
    pub fn new(fee_per_period: f64) -> Self {
        LinearBorrowingCost { fee_per_period }
    }
}

impl<N: Num> CostModel<N> for LinearBorrowingCost {
    fn trade_cost(&self, _price: N, _amount: N) -> N {
        N::zero()
    }

    fn holding_cost(&self, position: &Position<N>, final_index: usize) -> N {
        let entry = position.entry();
        if entry.side() != TradeSide::Sell {
            return N::zero();
        }
        let upto = match position.exit() {
            Some(exit) => exit.index().min(final_index),
            None => final_index,
        };
        let periods = upto.saturating_sub(entry.index());
        entry.value() * N::from_f64(self.fee_per_period) * N::from_usize(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn zero_cost_is_zero() {
        let cost = <ZeroCost as CostModel<f64>>::trade_cost(&ZeroCost, 100.0, 3.0);
        assert!(cost.abs() < f64::EPSILON);
    }

    #[test]
    fn linear_transaction_cost() {
        let model = LinearTransactionCost::new(0.01);
        let cost: f64 = model.trade_cost(100.0, 2.0);
        assert!((cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn borrowing_cost_applies_to_shorts_only() {
        let model: Arc<dyn CostModel<f64>> = Arc::new(LinearBorrowingCost::new(0.001));
        let zero: Arc<dyn CostModel<f64>> = Arc::new(ZeroCost);

        let mut short = Position::open(TradeSide::Sell, 2, 50.0, Some(2.0), zero.clone(), model.clone());
        short.close(7, 45.0).unwrap();
        // value 100, 5 bars at 0.1%
        assert!((short.holding_cost(10) - 0.5).abs() < 1e-12);
        // truncated at index 4: 2 bars
        assert!((short.holding_cost(4) - 0.2).abs() < 1e-12);

        let long = Position::open(TradeSide::Buy, 2, 50.0, Some(2.0), zero, model);
        assert!(long.holding_cost(10).abs() < f64::EPSILON);
    }

    #[test]
    fn borrowing_cost_open_position_accrues_to_final_index() {
        let model: Arc<dyn CostModel<f64>> = Arc::new(LinearBorrowingCost::new(0.01));
        let zero: Arc<dyn CostModel<f64>> = Arc::new(ZeroCost);
        let short = Position::open(TradeSide::Sell, 0, 10.0, Some(1.0), zero, model);
        assert!((short.holding_cost(3) - 0.3).abs() < 1e-12);
    }
}
