//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_selection, BacktestConfig, Decision, Evaluation};
use crate::domain::config_validation::{
    parse_optional_date, parse_strategy_keys, validate_backtest_config, validate_data_config,
};
use crate::domain::error::StratevalError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::strategy::{Candidate, Strategy, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "strateval", about = "Rank trading rules against buy and hold")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate strategies and pick the best one
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range and columns of a price file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Install a stderr `tracing` subscriber; `RUST_LOG` overrides the INFO default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .init()
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Evaluate {
            config,
            data,
            output,
        } => run_evaluate(&config, data.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StratevalError> {
    FileConfigAdapter::from_file(path)
}

fn fail(err: &StratevalError) -> ExitCode {
    error!("{err}");
    err.into()
}

fn run_evaluate(
    config_path: &Path,
    data_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if data_override.is_none() {
        if let Err(e) = validate_data_config(&adapter) {
            return fail(&e);
        }
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    // Stage 2: Build candidates and engine config
    let candidates = match build_candidates(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let bt_config = build_backtest_config(&adapter);

    // Stage 3: Resolve data source and output directory
    let data_port = match build_data_adapter(&adapter, config_path, data_override) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let output_dir = output_override.cloned().or_else(|| {
        adapter
            .get_string("report", "output_dir")
            .map(|d| resolve_relative(config_path, Path::new(d.trim())))
    });

    // Stages 4-6: Load, evaluate, report
    run_evaluation_pipeline(
        &data_port,
        &candidates,
        &bt_config,
        &CsvReportAdapter::new(),
        output_dir.as_deref(),
    )
}

/// Relative paths in a config file are taken relative to the file itself.
fn resolve_relative(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    config_path
        .parent()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        periods_per_year: adapter.get_double("backtest", "periods_per_year", TRADING_DAYS_PER_YEAR),
        parallel: adapter.get_bool("backtest", "parallel", true),
    }
}

/// Candidates listed under `[backtest] strategies`, in listed order, or the
/// four built-in rules when the key is absent.
pub fn build_candidates(adapter: &dyn ConfigPort) -> Result<Vec<Candidate>, StratevalError> {
    let overbought = adapter.get_double("filtered_breakout", "overbought", DEFAULT_OVERBOUGHT);
    let oversold = adapter.get_double("filtered_breakout", "oversold", DEFAULT_OVERSOLD);

    let keys = match adapter.get_string("backtest", "strategies") {
        Some(list) => parse_strategy_keys(&list),
        None => Strategy::KEYS.iter().map(|k| k.to_string()).collect(),
    };

    keys.iter()
        .map(|key| {
            let strategy = match Strategy::from_key(key) {
                Some(Strategy::FilteredBreakout { .. }) => Strategy::FilteredBreakout {
                    overbought,
                    oversold,
                },
                Some(s) => s,
                None => {
                    return Err(StratevalError::ConfigInvalid {
                        section: "backtest".into(),
                        key: "strategies".into(),
                        reason: format!("unknown strategy '{key}'"),
                    });
                }
            };
            Ok(Candidate::from_strategy(strategy))
        })
        .collect()
}

pub fn build_data_adapter(
    adapter: &dyn ConfigPort,
    config_path: &Path,
    data_override: Option<&PathBuf>,
) -> Result<CsvAdapter, StratevalError> {
    let path = match data_override {
        Some(p) => p.clone(),
        None => {
            let raw = adapter
                .get_string("data", "path")
                .ok_or_else(|| StratevalError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                })?;
            resolve_relative(config_path, Path::new(raw.trim()))
        }
    };
    let start = parse_optional_date(adapter, "start_date")?;
    let end = parse_optional_date(adapter, "end_date")?;
    Ok(CsvAdapter::new(path).with_range(start, end))
}

pub fn run_evaluation_pipeline(
    data_port: &dyn DataPort,
    candidates: &[Candidate],
    bt_config: &BacktestConfig,
    report_port: &dyn ReportPort,
    output_dir: Option<&Path>,
) -> ExitCode {
    // Stage 4: Load enriched series
    let series = match data_port.load_series() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    info!(
        bars = series.len(),
        columns = %series.column_names().join(","),
        strategies = candidates.len(),
        "running evaluation"
    );

    // Stage 5: Evaluate and select
    let evaluation = match run_selection(&series, candidates, series.bars(), bt_config) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    print!("{}", format_summary(&evaluation));

    // Stage 6: Write report
    if let Some(dir) = output_dir {
        if let Err(e) = report_port.write(&evaluation, &series, dir) {
            return fail(&e);
        }
        info!(dir = %dir.display(), "report written");
    }

    if evaluation.runs.is_empty() {
        warn!("no strategy could be evaluated");
        return ExitCode::from(5);
    }
    ExitCode::SUCCESS
}

/// Console summary: the results table, rejected strategies and the decision.
pub fn format_summary(evaluation: &Evaluation) -> String {
    let mut lines = vec![
        String::new(),
        "Strategy Performance (all strategies):".to_string(),
        format!(
            "{:<20} {:>12} {:>8} {:>8} {:>9} {:>8} {:>10} {:>7}",
            "Strategy", "Total Return", "Sharpe", "Sortino", "Win Rate", "PF", "Avg Trade", "Trades"
        ),
    ];
    lines.extend(evaluation.runs.iter().map(|run| {
        let r = &run.result;
        format!(
            "{:<20} {:>11.2}% {:>8.2} {:>8.2} {:>8.1}% {:>8.2} {:>9.2}% {:>7}",
            r.name,
            r.total_return * 100.0,
            r.sharpe_ratio,
            r.sortino_ratio,
            r.win_rate,
            r.profit_factor,
            r.avg_trade_return * 100.0,
            r.trade_count,
        )
    }));
    lines.extend(
        evaluation
            .failures
            .iter()
            .map(|f| format!("{:<20} rejected: {}", f.name, f.error)),
    );

    if let Some(best) = evaluation.runs.first() {
        lines.push(String::new());
        lines.push(format!(
            "Best strategy among {}: {} ({:.2}%)",
            evaluation.runs.len(),
            best.result.name,
            best.result.total_return * 100.0
        ));
    }
    lines.push(format!(
        "Buy & Hold Total Return: {:.2}%",
        evaluation.decision.baseline_return() * 100.0
    ));
    lines.push(match &evaluation.decision {
        Decision::Selected { name, .. } => format!("{name} outperformed Buy & Hold."),
        Decision::BaselineWins { .. } => {
            "Buy & Hold was more profitable than the best strategy.".to_string()
        }
    });

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    info!(path = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    let candidates = match build_candidates(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    println!("Strategies:");
    for c in &candidates {
        println!("  {}", c.name);
    }
    println!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path) -> ExitCode {
    let series = match CsvAdapter::new(data_path.to_path_buf()).load_series() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let bars = series.bars();
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!(
            "{}: {} bars, {} to {}",
            data_path.display(),
            bars.len(),
            first.date,
            last.date
        );
    }
    let columns = series.column_names();
    if columns.is_empty() {
        println!("indicator columns: none");
    } else {
        println!("indicator columns: {}", columns.join(", "));
    }
    for key in Strategy::KEYS {
        if let Some(strategy) = Strategy::from_key(key) {
            let ready = strategy
                .required_columns()
                .iter()
                .all(|c| series.has_column(*c));
            println!(
                "  {:<18} {}",
                strategy.display_name(),
                if ready { "ready" } else { "missing columns" }
            );
        }
    }
    ExitCode::SUCCESS
}
