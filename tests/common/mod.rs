#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use strateval::domain::backtest::Evaluation;
use strateval::domain::enriched::EnrichedSeries;
use strateval::domain::error::StratevalError;
pub use strateval::domain::price::PriceBar;
use strateval::domain::signal::{parse_signals, Signal};
use strateval::domain::strategy::SignalProvider;
use strateval::ports::data_port::DataPort;
use strateval::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub series: Option<EnrichedSeries>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(series: EnrichedSeries) -> Self {
        Self {
            series: Some(series),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            series: None,
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self) -> Result<EnrichedSeries, StratevalError> {
        if let Some(reason) = &self.error {
            return Err(StratevalError::DataLoad {
                reason: reason.clone(),
            });
        }
        Ok(self.series.clone().unwrap_or_default())
    }
}

/// Records what it was asked to write instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<(Vec<String>, Option<String>, PathBuf)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(
        &self,
        evaluation: &Evaluation,
        _series: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<(), StratevalError> {
        let ranked = evaluation
            .runs
            .iter()
            .map(|r| r.result.name.clone())
            .collect();
        let selected = evaluation.decision.selected_name().map(str::to_string);
        self.written
            .borrow_mut()
            .push((ranked, selected, output_dir.to_path_buf()));
        Ok(())
    }
}

/// Provider that ignores the series and returns a fixed raw signal list.
pub struct FixedSignals(pub Vec<i64>);

impl SignalProvider for FixedSignals {
    fn generate(&self, _series: &EnrichedSeries) -> Result<Vec<Signal>, StratevalError> {
        parse_signals(&self.0)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> PriceBar {
    PriceBar::new(
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        close,
    )
}

/// Consecutive daily bars starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> EnrichedSeries {
    EnrichedSeries::new(bars_from_closes(closes))
}

/// Contents of a small enriched CSV file covering every indicator column.
pub fn enriched_csv() -> String {
    let mut out = String::from(
        "date,close,high,low,donchian_high,donchian_low,rsi,regime_state,smoothed_price\n",
    );
    let rows = [
        ("2024-01-01", 100.0, "", "", "", "0", "100.0"),
        ("2024-01-02", 103.0, "101.0", "99.0", "55.0", "1", "101.0"),
        ("2024-01-03", 106.0, "104.0", "99.0", "62.0", "1", "103.0"),
        ("2024-01-04", 101.0, "107.0", "99.0", "58.0", "0", "104.0"),
        ("2024-01-05", 97.0, "107.0", "99.0", "45.0", "0", "102.0"),
        ("2024-01-06", 95.0, "107.0", "96.0", "38.0", "2", "99.0"),
        ("2024-01-07", 99.0, "107.0", "94.0", "47.0", "2", "98.0"),
        ("2024-01-08", 108.0, "107.0", "94.0", "72.0", "1", "100.0"),
    ];
    for (d, close, dh, dl, rsi, state, smooth) in rows {
        out.push_str(&format!(
            "{d},{close:.1},{:.1},{:.1},{dh},{dl},{rsi},{state},{smooth}\n",
            close + 1.0,
            close - 1.0
        ));
    }
    out
}
