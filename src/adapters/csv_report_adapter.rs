//! CSV report adapter.
//!
//! Writes into an output directory:
//! - `results.csv`: one ranked row per strategy
//! - `decision.csv`: the selected strategy (or buy and hold) and baseline
//! - `<slug>_series.csv`: per-step close, signal, return, equity, buy_hold
//! - `<slug>_trades.csv`: closed trades
//!
//! Undefined statistics are written as `NaN`.

use crate::domain::backtest::{Decision, Evaluation, StrategyRun};
use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StratevalError;
use crate::domain::returns::ReturnSeries;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    rank: usize,
    strategy: &'a str,
    total_return: f64,
    sharpe_ratio: f64,
    sortino_ratio: f64,
    win_rate: f64,
    profit_factor: f64,
    avg_trade_return: f64,
    trades: usize,
}

#[derive(Debug, Serialize)]
struct DecisionRow<'a> {
    selected: &'a str,
    total_return: f64,
    baseline_return: f64,
}

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: NaiveDate,
    close: f64,
    signal: i64,
    #[serde(rename = "return")]
    ret: f64,
    equity: f64,
    buy_hold: f64,
}

#[derive(Debug, Serialize)]
struct TradeRow {
    direction: String,
    entry_date: NaiveDate,
    exit_date: NaiveDate,
    entry_price: f64,
    exit_price: f64,
    #[serde(rename = "return")]
    ret: f64,
}

/// File-name-safe form of a strategy name: "Donchian + RSI" -> "donchian_rsi".
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn writer(path: &Path) -> Result<csv::Writer<fs::File>, StratevalError> {
        csv::Writer::from_path(path).map_err(|e| report_error(path, e))
    }

    fn write_results(&self, evaluation: &Evaluation, dir: &Path) -> Result<(), StratevalError> {
        let path = dir.join("results.csv");
        let mut wtr = Self::writer(&path)?;
        for (i, run) in evaluation.runs.iter().enumerate() {
            let r = &run.result;
            wtr.serialize(ResultRow {
                rank: i + 1,
                strategy: &r.name,
                total_return: r.total_return,
                sharpe_ratio: r.sharpe_ratio,
                sortino_ratio: r.sortino_ratio,
                win_rate: r.win_rate,
                profit_factor: r.profit_factor,
                avg_trade_return: r.avg_trade_return,
                trades: r.trade_count,
            })
            .map_err(|e| report_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_decision(&self, decision: &Decision, dir: &Path) -> Result<(), StratevalError> {
        let path = dir.join("decision.csv");
        let mut wtr = Self::writer(&path)?;
        let row = match decision {
            Decision::Selected {
                name,
                run,
                baseline_return,
            } => DecisionRow {
                selected: name,
                total_return: run.result.total_return,
                baseline_return: *baseline_return,
            },
            Decision::BaselineWins { baseline_return } => DecisionRow {
                selected: "buy_and_hold",
                total_return: *baseline_return,
                baseline_return: *baseline_return,
            },
        };
        wtr.serialize(row).map_err(|e| report_error(&path, e))?;
        wtr.flush()?;
        Ok(())
    }

    fn write_series(
        &self,
        run: &StrategyRun,
        series: &EnrichedSeries,
        baseline: &ReturnSeries,
        dir: &Path,
    ) -> Result<(), StratevalError> {
        let path = dir.join(format!("{}_series.csv", slug(&run.result.name)));
        let mut wtr = Self::writer(&path)?;
        for (i, bar) in series.bars().iter().enumerate() {
            wtr.serialize(SeriesRow {
                date: bar.date,
                close: bar.close,
                signal: run.signals[i].as_i64(),
                ret: run.series.returns[i],
                equity: run.series.equity[i],
                buy_hold: baseline.equity.get(i).copied().unwrap_or(f64::NAN),
            })
            .map_err(|e| report_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(&self, run: &StrategyRun, dir: &Path) -> Result<(), StratevalError> {
        let path = dir.join(format!("{}_trades.csv", slug(&run.result.name)));
        let mut wtr = Self::writer(&path)?;
        for t in &run.trades {
            wtr.serialize(TradeRow {
                direction: t.direction.to_string(),
                entry_date: t.entry_date,
                exit_date: t.exit_date,
                entry_price: t.entry_price,
                exit_price: t.exit_price,
                ret: t.ret,
            })
            .map_err(|e| report_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn report_error(path: &Path, err: impl std::fmt::Display) -> StratevalError {
    StratevalError::Report {
        reason: format!("{}: {}", path.display(), err),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        evaluation: &Evaluation,
        series: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<(), StratevalError> {
        fs::create_dir_all(output_dir)?;
        self.write_results(evaluation, output_dir)?;
        self.write_decision(&evaluation.decision, output_dir)?;
        for run in &evaluation.runs {
            self.write_series(run, series, &evaluation.baseline, output_dir)?;
            self.write_trades(run, output_dir)?;
        }
        Ok(())
    }
}
