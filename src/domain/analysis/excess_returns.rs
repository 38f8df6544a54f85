//! Account returns in excess of a risk-free accrual.
//!
//! Per-bar account returns come from the cash-flow curve while a position is
//! held and from the [`CashReturnPolicy`] while the account sits in cash.

use std::fmt;
use std::str::FromStr;

use super::cash_flow::CashFlow;
use super::frequency::delta_years;
use super::{
    determine_end_index, effective_open_position_handling, CurveOptions, EquityCurveMode,
    OpenPositionHandling, PerformanceIndicator,
};
use crate::domain::bar::BarSeries;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

/// What idle capital earns between positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CashReturnPolicy {
    #[default]
    CashEarnsRiskFree,
    CashEarnsZero,
}

impl fmt::Display for CashReturnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashReturnPolicy::CashEarnsRiskFree => write!(f, "cash_earns_risk_free"),
            CashReturnPolicy::CashEarnsZero => write!(f, "cash_earns_zero"),
        }
    }
}

impl FromStr for CashReturnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash_earns_risk_free" | "risk_free" => Ok(CashReturnPolicy::CashEarnsRiskFree),
            "cash_earns_zero" | "zero" => Ok(CashReturnPolicy::CashEarnsZero),
            other => Err(format!("unknown cash return policy '{other}'")),
        }
    }
}

pub struct ExcessReturns<'a, N: Num> {
    series: &'a BarSeries<N>,
    annual_risk_free_rate: N,
    cash_return_policy: CashReturnPolicy,
    equity: CashFlow<'a, N>,
    invested: Vec<bool>,
}

impl<'a, N: Num> ExcessReturns<'a, N> {
    pub fn new(
        series: &'a BarSeries<N>,
        annual_risk_free_rate: N,
        cash_return_policy: CashReturnPolicy,
        record: &TradingRecord<N>,
        mode: EquityCurveMode,
        open_position_handling: OpenPositionHandling,
    ) -> Self {
        let final_index = record.end_index(series);
        let options = CurveOptions::default()
            .with_final_index(final_index)
            .with_mode(mode)
            .with_open_position_handling(open_position_handling);
        let equity = CashFlow::build(series, record, options);

        let mut invested = vec![false; series.bar_count()];
        let mut mark = |position: &Position<N>| {
            let entry_index = position.entry().index();
            if entry_index > series.end_index() {
                return;
            }
            let end_index = determine_end_index(position, final_index, series.end_index());
            for flag in &mut invested[entry_index + 1..=end_index] {
                *flag = true;
            }
        };
        for position in record.positions() {
            if mode == EquityCurveMode::MarkToMarket
                || position.exit().is_some_and(|exit| exit.index() <= final_index)
            {
                mark(position);
            }
        }
        let handling = effective_open_position_handling(mode, open_position_handling);
        if handling == OpenPositionHandling::MarkToMarket {
            if let Some(current) = record.current_position().filter(|p| p.is_opened()) {
                mark(current);
            }
        }

        ExcessReturns {
            series,
            annual_risk_free_rate,
            cash_return_policy,
            equity,
            invested,
        }
    }

    /// Whether the account holds a position over bar `index`.
    pub fn is_invested(&self, index: usize) -> bool {
        self.invested.get(index).copied().unwrap_or(false)
    }

    /// `(1 + annual rate)^years - 1` between the end times of two bars.
    pub fn risk_free_return(&self, previous: usize, current: usize) -> N {
        let years = delta_years(self.series, previous, current);
        (N::one() + self.annual_risk_free_rate).powf(years) - N::one()
    }

    fn account_return(&self, index: usize) -> N {
        if !self.is_invested(index) {
            return match self.cash_return_policy {
                CashReturnPolicy::CashEarnsRiskFree => self.risk_free_return(index - 1, index),
                CashReturnPolicy::CashEarnsZero => N::zero(),
            };
        }
        let before = self.equity.value_at(index - 1);
        if !before.is_positive() {
            return N::zero();
        }
        self.equity.value_at(index) / before - N::one()
    }

    /// Compounded account growth over `(previous, current]` minus compounded
    /// risk-free growth over the same bars.
    pub fn excess_return(&self, previous: usize, current: usize) -> N {
        let mut growth = N::one();
        let mut risk_free_growth = N::one();
        for index in previous + 1..=current {
            growth = growth * (N::one() + self.account_return(index));
            risk_free_growth = risk_free_growth * (N::one() + self.risk_free_return(index - 1, index));
        }
        growth - risk_free_growth
    }
}
