//! Realized returns and equity curves.

use crate::domain::error::StratevalError;
use crate::domain::price::{price_returns, PriceBar};
use crate::domain::signal::Signal;
use crate::domain::validation::validate_alignment;

/// Per-step realized returns and the equity curve compounded from them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries {
    pub returns: Vec<f64>,
    pub equity: Vec<f64>,
}

impl ReturnSeries {
    /// Compounds `returns` into an equity curve with base 1.0.
    pub fn from_returns(returns: Vec<f64>) -> Self {
        let mut equity = Vec::with_capacity(returns.len());
        let mut value = 1.0_f64;
        for r in &returns {
            value *= 1.0 + r;
            equity.push(value);
        }
        Self { returns, equity }
    }

    /// equity[last] - 1, or 0 for an empty series.
    pub fn total_return(&self) -> f64 {
        self.equity.last().map(|e| e - 1.0).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Realized returns for `signals` applied to `bars`.
///
/// The return at step `t` uses the signal from step `t - 1`; the signal at
/// the final bar never affects any return.
pub fn strategy_returns(
    bars: &[PriceBar],
    signals: &[Signal],
) -> Result<ReturnSeries, StratevalError> {
    validate_alignment(bars, signals)?;
    let raw = price_returns(bars);
    let returns = raw
        .iter()
        .enumerate()
        .map(|(t, r)| match t {
            0 => 0.0,
            _ => r * signals[t - 1].exposure(),
        })
        .collect();
    Ok(ReturnSeries::from_returns(returns))
}

/// Always-long reference: unlagged price returns compounded over the series.
pub fn buy_and_hold(bars: &[PriceBar]) -> ReturnSeries {
    ReturnSeries::from_returns(price_returns(bars))
}
