//! Strategy evaluation and selection.
//!
//! Each candidate is evaluated independently (signals, realized returns,
//! closed trades, metrics). Runs are ranked by total return and the best
//! one is compared against an always-long baseline over the raw series.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StratevalError;
use crate::domain::metrics::{StrategyResult, TRADING_DAYS_PER_YEAR};
use crate::domain::price::PriceBar;
use crate::domain::returns::{buy_and_hold, strategy_returns, ReturnSeries};
use crate::domain::signal::Signal;
use crate::domain::strategy::{Candidate, SignalProvider};
use crate::domain::trade::{segment_trades, Trade};
use crate::domain::validation::{validate_inputs, validate_prices};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub periods_per_year: f64,
    pub parallel: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            parallel: true,
        }
    }
}

/// Everything computed for one strategy, retained for presentation.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub result: StrategyResult,
    pub signals: Vec<Signal>,
    pub series: ReturnSeries,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone)]
pub enum Decision {
    Selected {
        name: String,
        run: StrategyRun,
        baseline_return: f64,
    },
    BaselineWins {
        baseline_return: f64,
    },
}

impl Decision {
    pub fn baseline_return(&self) -> f64 {
        match self {
            Decision::Selected {
                baseline_return, ..
            }
            | Decision::BaselineWins { baseline_return } => *baseline_return,
        }
    }

    pub fn selected_name(&self) -> Option<&str> {
        match self {
            Decision::Selected { name, .. } => Some(name),
            Decision::BaselineWins { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct StrategyFailure {
    pub name: String,
    pub error: StratevalError,
}

#[derive(Debug)]
pub struct Evaluation {
    /// Successful runs, best total return first.
    pub runs: Vec<StrategyRun>,
    pub failures: Vec<StrategyFailure>,
    pub baseline: ReturnSeries,
    pub decision: Decision,
}

/// Evaluate a fixed signal series against `bars`.
pub fn evaluate_signals(
    name: &str,
    bars: &[PriceBar],
    signals: Vec<Signal>,
    config: &BacktestConfig,
) -> Result<StrategyRun, StratevalError> {
    validate_inputs(bars, &signals)?;
    let series = strategy_returns(bars, &signals)?;
    let trades = segment_trades(bars, &signals)?;
    let result = StrategyResult::compute(name, &series, &trades, config.periods_per_year);
    Ok(StrategyRun {
        result,
        signals,
        series,
        trades,
    })
}

/// Generate signals from `provider` and evaluate them.
pub fn evaluate_strategy(
    name: &str,
    provider: &dyn SignalProvider,
    series: &EnrichedSeries,
    config: &BacktestConfig,
) -> Result<StrategyRun, StratevalError> {
    let signals = provider.generate(series)?;
    let run = evaluate_signals(name, series.bars(), signals, config)?;
    debug!(
        strategy = name,
        total_return = run.result.total_return,
        trades = run.result.trade_count,
        "evaluated strategy"
    );
    Ok(run)
}

/// Stable sort by total return, descending. Equal returns keep input order.
pub fn rank_runs(runs: &mut [StrategyRun]) {
    runs.sort_by(|a, b| b.result.total_return.total_cmp(&a.result.total_return));
}

/// Compare the best run with the baseline. The baseline must strictly beat
/// the strategy to win.
pub fn decide(ranked: &[StrategyRun], baseline_return: f64) -> Decision {
    match ranked.first() {
        Some(best) if baseline_return <= best.result.total_return => Decision::Selected {
            name: best.result.name.clone(),
            run: best.clone(),
            baseline_return,
        },
        _ => Decision::BaselineWins { baseline_return },
    }
}

/// Evaluate every candidate, rank the survivors and decide against the
/// baseline computed from `raw_bars`.
///
/// A candidate whose inputs fail validation is recorded in
/// [`Evaluation::failures`] and does not affect the others. Only invalid
/// raw bars abort the whole selection.
pub fn run_selection(
    series: &EnrichedSeries,
    candidates: &[Candidate],
    raw_bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<Evaluation, StratevalError> {
    validate_prices(raw_bars)?;

    let evaluate = |c: &Candidate| {
        (
            c.name.clone(),
            evaluate_strategy(&c.name, c.provider.as_ref(), series, config),
        )
    };
    let outcomes: Vec<(String, Result<StrategyRun, StratevalError>)> = if config.parallel {
        candidates.par_iter().map(evaluate).collect()
    } else {
        candidates.iter().map(evaluate).collect()
    };

    let mut runs = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(run) => runs.push(run),
            Err(error) => {
                warn!(strategy = %name, %error, "strategy rejected");
                failures.push(StrategyFailure { name, error });
            }
        }
    }

    rank_runs(&mut runs);
    let baseline = buy_and_hold(raw_bars);
    let decision = decide(&runs, baseline.total_return());

    match &decision {
        Decision::Selected { name, run, .. } => info!(
            strategy = %name,
            total_return = run.result.total_return,
            baseline_return = decision.baseline_return(),
            "strategy outperformed buy and hold"
        ),
        Decision::BaselineWins { baseline_return } => info!(
            baseline_return = *baseline_return,
            "buy and hold outperformed every strategy"
        ),
    }

    Ok(Evaluation {
        runs,
        failures,
        baseline,
        decision,
    })
}
