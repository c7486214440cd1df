//! Performance metrics and statistics.
//!
//! Every statistic is an independent reduction over the realized return
//! series and the closed-trade list. Degenerate inputs (empty series, zero
//! variance, no losses, no trades) produce `f64::NAN` in the affected field
//! rather than an error.

use crate::domain::returns::ReturnSeries;
use crate::domain::trade::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub name: String,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Percentage of winning steps among steps with a nonzero return.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_trade_return: f64,
    pub trade_count: usize,
}

impl StrategyResult {
    pub fn compute(
        name: &str,
        series: &ReturnSeries,
        trades: &[Trade],
        periods_per_year: f64,
    ) -> Self {
        let returns = &series.returns;
        let annualization = periods_per_year.sqrt();

        StrategyResult {
            name: name.to_string(),
            total_return: series.total_return(),
            sharpe_ratio: compute_sharpe(returns, annualization),
            sortino_ratio: compute_sortino(returns, annualization),
            win_rate: compute_win_rate(returns),
            profit_factor: compute_profit_factor(returns),
            avg_trade_return: compute_avg_trade_return(trades),
            trade_count: trades.len(),
        }
    }

    /// Bitwise equality, treating NaN fields as equal to themselves.
    pub fn bit_eq(&self, other: &Self) -> bool {
        let fields = |r: &Self| {
            [
                r.total_return,
                r.sharpe_ratio,
                r.sortino_ratio,
                r.win_rate,
                r.profit_factor,
                r.avg_trade_return,
            ]
            .map(f64::to_bits)
        };
        self.name == other.name
            && self.trade_count == other.trade_count
            && fields(self) == fields(other)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Undefined below two
/// observations.
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn ratio(numerator: Option<f64>, deviation: Option<f64>, annualization: f64) -> f64 {
    match (numerator, deviation) {
        (Some(m), Some(sd)) if sd > 0.0 => m / sd * annualization,
        _ => f64::NAN,
    }
}

fn compute_sharpe(returns: &[f64], annualization: f64) -> f64 {
    ratio(mean(returns), sample_stddev(returns), annualization)
}

fn compute_sortino(returns: &[f64], annualization: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return f64::NAN;
    }
    ratio(mean(returns), sample_stddev(&downside), annualization)
}

fn compute_win_rate(returns: &[f64]) -> f64 {
    let wins = returns.iter().filter(|r| **r > 0.0).count();
    let active = returns.iter().filter(|r| **r != 0.0).count().max(1);
    wins as f64 / active as f64 * 100.0
}

fn compute_profit_factor(returns: &[f64]) -> f64 {
    let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|r| **r < 0.0).sum::<f64>().abs();
    if losses == 0.0 {
        return f64::NAN;
    }
    gains / losses
}

fn compute_avg_trade_return(trades: &[Trade]) -> f64 {
    let rets: Vec<f64> = trades.iter().map(|t| t.ret).collect();
    mean(&rets).unwrap_or(f64::NAN)
}
