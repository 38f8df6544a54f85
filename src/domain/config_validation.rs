//! Loading and validating Sharpe/PSR settings from a config source.
//!
//! Everything lives in the `[sharpe]` section. Only `risk_free_rate` is
//! required; every other key falls back to the [`SharpeConfig`] default.

use std::fmt::Display;
use std::str::FromStr;

use chrono_tz::Tz;
use tracing::debug;

use crate::domain::criteria::sharpe::SharpeConfig;
use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;

pub const SECTION: &str = "sharpe";

pub fn load_sharpe_config(config: &dyn ConfigPort) -> Result<SharpeConfig, AnalysisError> {
    let defaults = SharpeConfig::default();
    let sharpe = SharpeConfig {
        risk_free_rate: validate_risk_free_rate(config)?,
        sampling_frequency: parse_or(config, "sampling_frequency", defaults.sampling_frequency)?,
        annualization: parse_or(config, "annualization", defaults.annualization)?,
        time_zone: parse_or::<Tz>(config, "time_zone", defaults.time_zone)?,
        cash_return_policy: parse_or(config, "cash_return_policy", defaults.cash_return_policy)?,
        equity_curve_mode: parse_or(config, "equity_curve_mode", defaults.equity_curve_mode)?,
        open_position_handling: parse_or(
            config,
            "open_position_handling",
            defaults.open_position_handling,
        )?,
        benchmark_sharpe: validate_finite(config, "benchmark_sharpe", defaults.benchmark_sharpe)?,
        autocorrelation: validate_finite(config, "autocorrelation", defaults.autocorrelation)?,
        trials: parse_or(config, "trials", defaults.trials)?,
    };
    sharpe.validate()?;
    debug!(
        risk_free_rate = sharpe.risk_free_rate,
        sampling = %sharpe.sampling_frequency,
        annualization = %sharpe.annualization,
        time_zone = %sharpe.time_zone,
        "loaded sharpe config"
    );
    Ok(sharpe)
}

fn invalid(key: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_or<T>(config: &dyn ConfigPort, key: &str, default: T) -> Result<T, AnalysisError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(SECTION, key) {
        None => Ok(default),
        Some(s) if s.trim().is_empty() => Ok(default),
        Some(s) => s.trim().parse().map_err(|e: T::Err| invalid(key, e.to_string())),
    }
}

fn validate_finite(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, AnalysisError> {
    let value: f64 = parse_or(config, key, default)?;
    if !value.is_finite() {
        return Err(invalid(key, format!("{key} must be a finite number")));
    }
    Ok(value)
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<f64, AnalysisError> {
    let raw = match config.get_string(SECTION, "risk_free_rate") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(AnalysisError::ConfigMissing {
                section: SECTION.to_string(),
                key: "risk_free_rate".to_string(),
            })
        }
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("risk_free_rate", "risk_free_rate must be a number"))?;
    if !value.is_finite() || value <= -1.0 {
        return Err(invalid(
            "risk_free_rate",
            "risk_free_rate must be finite and greater than -1",
        ));
    }
    Ok(value)
}
