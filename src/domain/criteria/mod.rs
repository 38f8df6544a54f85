//! Analysis criteria: scalar scores of a position or a whole trading record.

pub mod pnl;
pub mod sharpe;

use super::bar::BarSeries;
use super::num::Num;
use super::position::Position;
use super::trading_record::TradingRecord;

/// A stateless score. Every call is a pure function of its inputs.
pub trait AnalysisCriterion<N: Num> {
    fn calculate_position(&self, series: &BarSeries<N>, position: &Position<N>) -> N;

    fn calculate(&self, series: &BarSeries<N>, record: &TradingRecord<N>) -> N;

    /// Higher is better unless a criterion says otherwise.
    fn better_than(&self, a: N, b: N) -> bool {
        a > b
    }
}

/// Whether profits are taken before or after trade and holding costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfitBasis {
    Gross,
    #[default]
    Net,
}

impl ProfitBasis {
    pub fn profit_of<N: Num>(self, position: &Position<N>) -> N {
        match self {
            ProfitBasis::Gross => position.gross_profit(),
            ProfitBasis::Net => position.profit(),
        }
    }
}
