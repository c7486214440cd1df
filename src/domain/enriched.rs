//! Price series enriched with precomputed indicator columns.
//!
//! Indicators are computed upstream; this type only carries them alongside
//! the bars so signal providers can read them by name.

use crate::domain::error::StratevalError;
use crate::domain::price::PriceBar;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DonchianHigh,
    DonchianLow,
    Rsi,
    RegimeState,
    SmoothedPrice,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::DonchianHigh,
        Column::DonchianLow,
        Column::Rsi,
        Column::RegimeState,
        Column::SmoothedPrice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::DonchianHigh => "donchian_high",
            Column::DonchianLow => "donchian_low",
            Column::Rsi => "rsi",
            Column::RegimeState => "regime_state",
            Column::SmoothedPrice => "smoothed_price",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnrichedSeries {
    bars: Vec<PriceBar>,
    columns: HashMap<Column, Vec<Option<f64>>>,
}

impl EnrichedSeries {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self {
            bars,
            columns: HashMap::new(),
        }
    }

    /// Returns a new series carrying `values` under `column`. The column
    /// must be time-aligned with the bars.
    pub fn with_column(
        mut self,
        column: Column,
        values: Vec<Option<f64>>,
    ) -> Result<Self, StratevalError> {
        if values.len() != self.bars.len() {
            return Err(StratevalError::ColumnLength {
                column: column.name().to_string(),
                expected: self.bars.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(column, values);
        Ok(self)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn column(&self, column: Column) -> Result<&[Option<f64>], StratevalError> {
        self.columns
            .get(&column)
            .map(Vec::as_slice)
            .ok_or_else(|| StratevalError::MissingColumn {
                column: column.name().to_string(),
            })
    }

    /// Columns present, in declaration order.
    pub fn column_names(&self) -> Vec<&'static str> {
        Column::ALL
            .into_iter()
            .filter(|c| self.has_column(*c))
            .map(Column::name)
            .collect()
    }
}
