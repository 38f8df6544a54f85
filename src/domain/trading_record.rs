//! Ordered record of closed positions plus at most one open position.

use std::sync::Arc;

use super::bar::BarSeries;
use super::cost::{CostModel, ZeroCost};
use super::error::AnalysisError;
use super::num::Num;
use super::position::{Position, TradeSide};

#[derive(Debug, Clone)]
pub struct TradingRecord<N: Num> {
    starting_side: TradeSide,
    positions: Vec<Position<N>>,
    current: Option<Position<N>>,
    start_index: Option<usize>,
    end_index: Option<usize>,
    transaction_cost_model: Arc<dyn CostModel<N>>,
    holding_cost_model: Arc<dyn CostModel<N>>,
}

impl<N: Num> Default for TradingRecord<N> {
    fn default() -> Self {
        TradingRecord::new(TradeSide::Buy)
    }
}

impl<N: Num> TradingRecord<N> {
    /// An empty record whose positions open with `starting_side` and cost nothing.
    pub fn new(starting_side: TradeSide) -> Self {
        TradingRecord::with_cost_models(starting_side, Arc::new(ZeroCost), Arc::new(ZeroCost))
    }

    pub fn with_cost_models(
        starting_side: TradeSide,
        transaction_cost_model: Arc<dyn CostModel<N>>,
        holding_cost_model: Arc<dyn CostModel<N>>,
    ) -> Self {
        TradingRecord {
            starting_side,
            positions: Vec::new(),
            current: None,
            start_index: None,
            end_index: None,
            transaction_cost_model,
            holding_cost_model,
        }
    }

    /// A record holding a single position, open or closed.
    pub fn from_position(position: Position<N>) -> Self {
        let mut record = TradingRecord::with_cost_models(
            position.entry().side(),
            Arc::new(ZeroCost),
            Arc::new(ZeroCost),
        );
        if position.is_closed() {
            record.positions.push(position);
        } else {
            record.current = Some(position);
        }
        record
    }

    /// Restrict the record to a sub-range of the series. Curves stop at
    /// `end_index`; Sharpe sampling also starts at `start_index`.
    pub fn with_range(mut self, start_index: usize, end_index: usize) -> Self {
        self.start_index = Some(start_index);
        self.end_index = Some(end_index);
        self
    }

    pub fn starting_side(&self) -> TradeSide {
        self.starting_side
    }

    /// Open a position at `index`. Entries must not precede the last exit.
    pub fn enter(&mut self, index: usize, price: N, amount: N) -> Result<(), AnalysisError> {
        self.enter_with_amount(index, price, Some(amount))
    }

    pub fn enter_with_amount(
        &mut self,
        index: usize,
        price: N,
        amount: Option<N>,
    ) -> Result<(), AnalysisError> {
        if self.current.is_some() {
            return Err(AnalysisError::PositionAlreadyOpen { index });
        }
        if let Some(last_exit) = self.last_exit_index() {
            if index < last_exit {
                return Err(AnalysisError::EntryBeforeLastExit { index, last_exit });
            }
        }
        self.current = Some(Position::open(
            self.starting_side,
            index,
            price,
            amount,
            self.transaction_cost_model.clone(),
            self.holding_cost_model.clone(),
        ));
        Ok(())
    }

    /// Close the open position at `index`; the exit reuses the entry amount.
    pub fn exit(&mut self, index: usize, price: N) -> Result<(), AnalysisError> {
        let mut position = self
            .current
            .take()
            .ok_or(AnalysisError::NoOpenPosition { index })?;
        if let Err(err) = position.close(index, price) {
            self.current = Some(position);
            return Err(err);
        }
        self.positions.push(position);
        Ok(())
    }

    /// Closed positions in chronological order.
    pub fn positions(&self) -> &[Position<N>] {
        &self.positions
    }

    /// The trailing open position, if any.
    pub fn current_position(&self) -> Option<&Position<N>> {
        self.current.as_ref()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_closed(&self) -> bool {
        self.current.is_none()
    }

    pub fn last_exit_index(&self) -> Option<usize> {
        self.positions
            .last()
            .and_then(|p| p.exit())
            .map(|exit| exit.index())
    }

    pub fn start_index(&self, series: &BarSeries<N>) -> usize {
        self.start_index.unwrap_or(series.begin_index())
    }

    /// The explicit end index, or the end of the series.
    pub fn end_index(&self, series: &BarSeries<N>) -> usize {
        self.end_index
            .unwrap_or(series.end_index())
            .min(series.end_index())
    }
}
