//! Profit and return criteria over closed positions.
//!
//! Open positions have no realized profit and never move these scores.

use super::{AnalysisCriterion, ProfitBasis};
use crate::domain::bar::BarSeries;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

fn closed<N: Num>(record: &TradingRecord<N>) -> impl Iterator<Item = &Position<N>> {
    record.positions().iter().filter(|p| p.is_closed())
}

/// Profit as a percentage of the capital committed at entry.
///
/// Across a record the profits and entry values are summed separately
/// before dividing, so small positions do not skew the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfitLossPercentageCriterion {
    basis: ProfitBasis,
}

impl ProfitLossPercentageCriterion {
    pub fn new(basis: ProfitBasis) -> Self {
        ProfitLossPercentageCriterion { basis }
    }

    pub fn gross() -> Self {
        ProfitLossPercentageCriterion::new(ProfitBasis::Gross)
    }

    pub fn net() -> Self {
        ProfitLossPercentageCriterion::new(ProfitBasis::Net)
    }

    fn percentage<N: Num>(profit: N, entry_value: N) -> N {
        if entry_value.is_zero() {
            return N::zero();
        }
        profit / entry_value * N::hundred()
    }
}

impl<N: Num> AnalysisCriterion<N> for ProfitLossPercentageCriterion {
    fn calculate_position(&self, _series: &BarSeries<N>, position: &Position<N>) -> N {
        if position.is_opened() {
            return N::zero();
        }
        Self::percentage(self.basis.profit_of(position), position.entry().value())
    }

    fn calculate(&self, _series: &BarSeries<N>, record: &TradingRecord<N>) -> N {
        let (profit, entry_value) = closed(record).fold((N::zero(), N::zero()), |(p, v), pos| {
            (p + self.basis.profit_of(pos), v + pos.entry().value())
        });
        Self::percentage(profit, entry_value)
    }
}

/// Mean profit of the winning positions.
pub fn average_profit<'p, N: Num>(
    positions: impl IntoIterator<Item = &'p Position<N>>,
    basis: ProfitBasis,
) -> N {
    let (total, count) = positions
        .into_iter()
        .map(|p| basis.profit_of(p))
        .filter(|profit| profit.is_positive())
        .fold((N::zero(), 0usize), |(t, c), profit| (t + profit, c + 1));
    if count == 0 {
        N::zero()
    } else {
        total / N::from_usize(count)
    }
}

/// Mean profit of the losing positions; negative or zero.
pub fn average_loss<'p, N: Num>(
    positions: impl IntoIterator<Item = &'p Position<N>>,
    basis: ProfitBasis,
) -> N {
    let (total, count) = positions
        .into_iter()
        .map(|p| basis.profit_of(p))
        .filter(|profit| *profit < N::zero())
        .fold((N::zero(), 0usize), |(t, c), profit| (t + profit, c + 1));
    if count == 0 {
        N::zero()
    } else {
        total / N::from_usize(count)
    }
}

/// `|average profit / average loss|`.
///
/// No winners scores `0`; winners without a single loser score `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfitLossRatioCriterion {
    basis: ProfitBasis,
}

impl ProfitLossRatioCriterion {
    pub fn new(basis: ProfitBasis) -> Self {
        ProfitLossRatioCriterion { basis }
    }

    fn ratio<N: Num>(average_profit: N, average_loss: N) -> N {
        if average_profit.is_zero() {
            return N::zero();
        }
        if average_loss.is_zero() {
            return N::one();
        }
        (average_profit / average_loss).abs()
    }
}

impl<N: Num> AnalysisCriterion<N> for ProfitLossRatioCriterion {
    fn calculate_position(&self, _series: &BarSeries<N>, position: &Position<N>) -> N {
        let single = std::iter::once(position).filter(|p| p.is_closed());
        let profit = average_profit(single.clone(), self.basis);
        let loss = average_loss(single, self.basis);
        Self::ratio(profit, loss)
    }

    fn calculate(&self, _series: &BarSeries<N>, record: &TradingRecord<N>) -> N {
        let profit = average_profit(closed(record), self.basis);
        let loss = average_loss(closed(record), self.basis);
        Self::ratio(profit, loss)
    }
}

/// Compounded return: the product of `1 + profit / entry value` over the
/// closed positions, optionally without the base of one.
///
/// The net profit here deducts trade costs only; holding costs stay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnCriterion {
    basis: ProfitBasis,
    add_base: bool,
}

impl Default for ReturnCriterion {
    fn default() -> Self {
        ReturnCriterion::net()
    }
}

impl ReturnCriterion {
    pub fn new(basis: ProfitBasis, add_base: bool) -> Self {
        ReturnCriterion { basis, add_base }
    }

    /// Return after trade costs, base included.
    pub fn net() -> Self {
        ReturnCriterion::new(ProfitBasis::Net, true)
    }

    /// Return on price alone, base included.
    pub fn gross() -> Self {
        ReturnCriterion::new(ProfitBasis::Gross, true)
    }

    pub fn without_base(mut self) -> Self {
        self.add_base = false;
        self
    }

    fn factor<N: Num>(&self, position: &Position<N>) -> N {
        if position.is_opened() {
            return N::one();
        }
        let entry_value = position.entry().value();
        if entry_value.is_zero() {
            return N::one();
        }
        let profit = match self.basis {
            ProfitBasis::Gross => position.gross_profit(),
            ProfitBasis::Net => position.gross_profit() - position.transaction_cost(),
        };
        N::one() + profit / entry_value
    }

    fn finish<N: Num>(&self, product: N) -> N {
        if self.add_base {
            product
        } else {
            product - N::one()
        }
    }
}

impl<N: Num> AnalysisCriterion<N> for ReturnCriterion {
    fn calculate_position(&self, _series: &BarSeries<N>, position: &Position<N>) -> N {
        self.finish(self.factor(position))
    }

    fn calculate(&self, _series: &BarSeries<N>, record: &TradingRecord<N>) -> N {
        let product = closed(record).fold(N::one(), |acc, p| acc * self.factor(p));
        self.finish(product)
    }
}
