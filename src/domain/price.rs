//! Price bar representation and simple price returns.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            high: None,
            low: None,
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    /// close / prev_close - 1
    pub fn return_from(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }
}

/// Unlagged close-to-close returns, one per bar. The first bar has no
/// predecessor and returns 0.
pub fn price_returns(bars: &[PriceBar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend(bars.windows(2).map(|w| w[1].return_from(w[0].close)));
    out
}
