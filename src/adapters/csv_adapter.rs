//! CSV file data adapter.
//!
//! Reads a header-addressed file with `date` and `close` plus any of the
//! optional `high`, `low` and indicator columns. Empty cells are missing
//! values.

use crate::domain::enriched::{Column, EnrichedSeries};
use crate::domain::error::StratevalError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Row {
    date: NaiveDate,
    close: f64,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    donchian_high: Option<f64>,
    #[serde(default)]
    donchian_low: Option<f64>,
    #[serde(default)]
    rsi: Option<f64>,
    #[serde(default)]
    regime_state: Option<f64>,
    #[serde(default)]
    smoothed_price: Option<f64>,
}

impl Row {
    fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::DonchianHigh => self.donchian_high,
            Column::DonchianLow => self.donchian_low,
            Column::Rsi => self.rsi,
            Column::RegimeState => self.regime_state,
            Column::SmoothedPrice => self.smoothed_price,
        }
    }

    fn bar(&self) -> PriceBar {
        PriceBar {
            date: self.date,
            close: self.close,
            high: self.high,
            low: self.low,
        }
    }
}

#[derive(Debug)]
pub struct CsvAdapter {
    path: PathBuf,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            start_date: None,
            end_date: None,
        }
    }

    /// Keep only bars dated within `[start, end]`; either bound may be open.
    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }

    fn load_error(&self, reason: impl std::fmt::Display) -> StratevalError {
        StratevalError::DataLoad {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl DataPort for CsvAdapter {
    fn load_series(&self) -> Result<EnrichedSeries, StratevalError> {
        let file = File::open(&self.path).map_err(|e| self.load_error(e))?;
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let headers = rdr.headers().map_err(|e| self.load_error(e))?.clone();
        let present: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|c| headers.iter().any(|h| h == c.name()))
            .collect();

        let mut rows = Vec::new();
        for result in rdr.deserialize::<Row>() {
            let row = result.map_err(|e| self.load_error(e))?;
            if self.in_range(row.date) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(StratevalError::NoData {
                path: self.path.display().to_string(),
            });
        }

        rows.sort_by_key(|r| r.date);

        let mut series = EnrichedSeries::new(rows.iter().map(Row::bar).collect());
        for column in present {
            let values = rows.iter().map(|r| r.value(column)).collect();
            series = series.with_column(column, values)?;
        }
        Ok(series)
    }
}
