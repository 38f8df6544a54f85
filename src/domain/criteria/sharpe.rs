//! Sharpe ratio and Probabilistic Sharpe Ratio (Bailey & López de Prado).
//!
//! Both share one pipeline: the series is cut into calendar samples, each
//! sample's account return is taken in excess of the risk-free accrual, and
//! the stream is folded into a [`SampleSummary`].
//!
//! Degenerate inputs (too few bars or samples, zero variance, a non-positive
//! variance of the estimator) score `0` instead of failing, so the criteria
//! stay safe to use inside parameter scans.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use statrs::function::erf::erfc;
use tracing::debug;

use super::AnalysisCriterion;
use crate::domain::analysis::excess_returns::{CashReturnPolicy, ExcessReturns};
use crate::domain::analysis::frequency::{
    delta_years, Sample, SamplingFrequency, SamplingFrequencyIndexes,
};
use crate::domain::analysis::sample_summary::SampleSummary;
use crate::domain::analysis::{EquityCurveMode, OpenPositionHandling};
use crate::domain::bar::BarSeries;
use crate::domain::error::AnalysisError;
use crate::domain::num::Num;
use crate::domain::position::Position;
use crate::domain::trading_record::TradingRecord;

/// Report per sample period or scaled to a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Annualization {
    Period,
    #[default]
    Annualized,
}

impl fmt::Display for Annualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annualization::Period => write!(f, "period"),
            Annualization::Annualized => write!(f, "annualized"),
        }
    }
}

impl FromStr for Annualization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "period" => Ok(Annualization::Period),
            "annualized" => Ok(Annualization::Annualized),
            other => Err(format!("unknown annualization '{other}'")),
        }
    }
}

/// Settings shared by [`SharpeRatioCriterion`] and
/// [`ProbabilisticSharpeRatioCriterion`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpeConfig {
    /// Annual risk-free rate, e.g. `0.04` for 4%.
    pub risk_free_rate: f64,
    pub sampling_frequency: SamplingFrequency,
    pub annualization: Annualization,
    /// Time zone the calendar sampling is grouped in.
    pub time_zone: Tz,
    pub cash_return_policy: CashReturnPolicy,
    pub equity_curve_mode: EquityCurveMode,
    pub open_position_handling: OpenPositionHandling,
    /// Benchmark Sharpe ratio, always per sample period.
    pub benchmark_sharpe: f64,
    /// AR(1) autocorrelation of the returns, strictly inside `(-1, 1)`.
    pub autocorrelation: f64,
    pub trials: u32,
}

impl Default for SharpeConfig {
    fn default() -> Self {
        SharpeConfig {
            risk_free_rate: 0.0,
            sampling_frequency: SamplingFrequency::Bar,
            annualization: Annualization::Annualized,
            time_zone: Tz::UTC,
            cash_return_policy: CashReturnPolicy::CashEarnsRiskFree,
            equity_curve_mode: EquityCurveMode::MarkToMarket,
            open_position_handling: OpenPositionHandling::MarkToMarket,
            benchmark_sharpe: 0.0,
            autocorrelation: 0.0,
            trials: 1,
        }
    }
}

impl SharpeConfig {
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    pub fn with_sampling(mut self, frequency: SamplingFrequency, time_zone: Tz) -> Self {
        self.sampling_frequency = frequency;
        self.time_zone = time_zone;
        self
    }

    pub fn with_annualization(mut self, annualization: Annualization) -> Self {
        self.annualization = annualization;
        self
    }

    pub fn with_cash_return_policy(mut self, policy: CashReturnPolicy) -> Self {
        self.cash_return_policy = policy;
        self
    }

    pub fn with_equity_curve_mode(mut self, mode: EquityCurveMode) -> Self {
        self.equity_curve_mode = mode;
        self
    }

    pub fn with_open_position_handling(mut self, handling: OpenPositionHandling) -> Self {
        self.open_position_handling = handling;
        self
    }

    pub fn with_benchmark_sharpe(mut self, benchmark: f64) -> Self {
        self.benchmark_sharpe = benchmark;
        self
    }

    pub fn with_autocorrelation(mut self, autocorrelation: f64) -> Self {
        self.autocorrelation = autocorrelation;
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    /// Reject settings the estimator is undefined for.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let rho = self.autocorrelation;
        if !(rho > -1.0 && rho < 1.0) {
            return Err(AnalysisError::InvalidAutocorrelation { value: rho });
        }
        if self.trials != 1 {
            return Err(AnalysisError::UnsupportedTrials {
                trials: self.trials,
            });
        }
        Ok(())
    }
}

/// Fold the excess returns of `record` over its index range into a summary.
///
/// `None` when the range has fewer than two bars after its first.
fn summarize<N: Num>(
    config: &SharpeConfig,
    series: &BarSeries<N>,
    record: &TradingRecord<N>,
) -> Option<SampleSummary<N>> {
    let begin = record.start_index(series);
    let start = begin + 1;
    let end = record.end_index(series);
    if end + 1 < start + 2 {
        debug!(begin, end, "range too short for sampling");
        return None;
    }

    let excess = ExcessReturns::new(
        series,
        N::from_f64(config.risk_free_rate),
        config.cash_return_policy,
        record,
        config.equity_curve_mode,
        config.open_position_handling,
    );
    let samples = SamplingFrequencyIndexes::new(
        series,
        config.sampling_frequency,
        config.time_zone,
        begin,
        start,
        end,
    )
    .map(|pair| Sample {
        excess_return: excess.excess_return(pair.previous, pair.current),
        period_years: delta_years(series, pair.previous, pair.current),
    });
    Some(SampleSummary::from_samples(samples))
}

/// Mean and standard deviation of a summary with at least two samples and
/// a positive variance.
fn moments<N: Num>(summary: &SampleSummary<N>) -> Option<(N, N)> {
    if summary.count() < 2 {
        debug!(samples = summary.count(), "too few samples");
        return None;
    }
    let variance = summary.variance();
    if !variance.is_positive() {
        debug!("zero variance of excess returns");
        return None;
    }
    let stdev = variance.sqrt();
    if stdev.is_zero() {
        return None;
    }
    Some((summary.mean(), stdev))
}

/// Mean over standard deviation of the sampled excess returns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharpeRatioCriterion {
    config: SharpeConfig,
}

impl SharpeRatioCriterion {
    pub fn new(config: SharpeConfig) -> Self {
        SharpeRatioCriterion { config }
    }

    pub fn config(&self) -> &SharpeConfig {
        &self.config
    }
}

impl<N: Num> AnalysisCriterion<N> for SharpeRatioCriterion {
    fn calculate_position(&self, series: &BarSeries<N>, position: &Position<N>) -> N {
        self.calculate(series, &TradingRecord::from_position(position.clone()))
    }

    fn calculate(&self, series: &BarSeries<N>, record: &TradingRecord<N>) -> N {
        let Some(summary) = summarize(&self.config, series, record) else {
            return N::zero();
        };
        let Some((mean, stdev)) = moments(&summary) else {
            return N::zero();
        };
        let sharpe = mean / stdev;
        match (self.config.annualization, summary.annualization_factor()) {
            (Annualization::Annualized, Some(factor)) => sharpe * factor,
            _ => sharpe,
        }
    }
}

/// Probability that the true Sharpe ratio exceeds the benchmark, given the
/// estimation error implied by sample size, skewness, kurtosis and
/// autocorrelation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilisticSharpeRatioCriterion {
    config: SharpeConfig,
}

impl ProbabilisticSharpeRatioCriterion {
    pub fn new(config: SharpeConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(ProbabilisticSharpeRatioCriterion { config })
    }

    pub fn config(&self) -> &SharpeConfig {
        &self.config
    }

    /// Variance of the per-period Sharpe estimator.
    fn sharpe_variance<N: Num>(&self, skewness: N, kurtosis: N, sharpe: N, count: usize) -> N {
        if count < 2 {
            return N::zero();
        }
        let rho = self.config.autocorrelation;
        let b = rho / (1.0 - rho);
        let c = rho * rho / (1.0 - rho * rho);

        let a_term = N::from_f64(1.0 + 2.0 * b);
        let skew_term = N::from_f64(1.0 + b + c) * skewness * sharpe;
        let kurt_term =
            N::from_f64(1.0 + 2.0 * c) * (kurtosis - N::one()) * sharpe * sharpe / N::from_i64(4);
        (a_term - skew_term + kurt_term) / N::from_usize(count - 1)
    }
}

/// Standard normal CDF.
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

impl<N: Num> AnalysisCriterion<N> for ProbabilisticSharpeRatioCriterion {
    fn calculate_position(&self, series: &BarSeries<N>, position: &Position<N>) -> N {
        self.calculate(series, &TradingRecord::from_position(position.clone()))
    }

    fn calculate(&self, series: &BarSeries<N>, record: &TradingRecord<N>) -> N {
        let zero = N::zero();
        let Some(summary) = summarize(&self.config, series, record) else {
            return zero;
        };
        let Some((mean, stdev)) = moments(&summary) else {
            return zero;
        };

        let sharpe_per_period = mean / stdev;
        let benchmark_per_period = N::from_f64(self.config.benchmark_sharpe);
        let factor = match self.config.annualization {
            Annualization::Period => None,
            Annualization::Annualized => summary.annualization_factor(),
        };

        let skewness = summary.skewness();
        let kurtosis = summary.excess_kurtosis() + N::from_i64(3);
        let variance_per_period =
            self.sharpe_variance(skewness, kurtosis, sharpe_per_period, summary.count());

        let (sharpe, benchmark, variance) = match factor {
            Some(f) => (
                sharpe_per_period * f,
                benchmark_per_period * f,
                variance_per_period * f * f,
            ),
            None => (sharpe_per_period, benchmark_per_period, variance_per_period),
        };
        if !variance.is_positive() {
            debug!(variance = ?variance, "non-positive Sharpe estimator variance");
            return zero;
        }
        let denominator = variance.sqrt();
        if denominator.is_zero() {
            return zero;
        }

        let z = ((sharpe - benchmark) / denominator).to_f64();
        N::from_f64(standard_normal_cdf(z))
    }
}
