//! Signal providers: rules that turn an enriched series into signals.
//!
//! Each rule reads precomputed indicator columns; none computes indicators
//! itself. Missing indicator values (warm-up gaps) compare false and yield a
//! flat signal.

use crate::domain::enriched::{Column, EnrichedSeries};
use crate::domain::error::StratevalError;
use crate::domain::signal::Signal;

pub const DEFAULT_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;

/// Produces one signal per bar of an enriched series.
pub trait SignalProvider: Send + Sync {
    fn generate(&self, series: &EnrichedSeries) -> Result<Vec<Signal>, StratevalError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Long above the channel high, short below the channel low.
    Breakout,
    /// Breakout gated by RSI: no longs when overbought, no shorts when
    /// oversold.
    FilteredBreakout { overbought: f64, oversold: f64 },
    /// Long on an upward hidden-state transition, short on a downward one.
    RegimeInference,
    /// Long above the smoothed trend, short below it.
    TrendSmoothing,
}

impl Strategy {
    pub const KEYS: [&'static str; 4] = ["breakout", "filtered_breakout", "regime", "trend"];

    pub fn from_key(key: &str) -> Option<Strategy> {
        match key {
            "breakout" => Some(Strategy::Breakout),
            "filtered_breakout" => Some(Strategy::FilteredBreakout {
                overbought: DEFAULT_OVERBOUGHT,
                oversold: DEFAULT_OVERSOLD,
            }),
            "regime" => Some(Strategy::RegimeInference),
            "trend" => Some(Strategy::TrendSmoothing),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::Breakout => "Donchian Breakout",
            Strategy::FilteredBreakout { .. } => "Donchian + RSI",
            Strategy::RegimeInference => "HMM Strategy",
            Strategy::TrendSmoothing => "Kalman Filter",
        }
    }

    pub fn required_columns(&self) -> &'static [Column] {
        match self {
            Strategy::Breakout => &[Column::DonchianHigh, Column::DonchianLow],
            Strategy::FilteredBreakout { .. } => {
                &[Column::DonchianHigh, Column::DonchianLow, Column::Rsi]
            }
            Strategy::RegimeInference => &[Column::RegimeState],
            Strategy::TrendSmoothing => &[Column::SmoothedPrice],
        }
    }
}

fn above(value: f64, level: Option<f64>) -> bool {
    level.is_some_and(|l| value > l)
}

fn below(value: f64, level: Option<f64>) -> bool {
    level.is_some_and(|l| value < l)
}

fn below_level(value: Option<f64>, level: f64) -> bool {
    value.is_some_and(|v| v < level)
}

fn above_level(value: Option<f64>, level: f64) -> bool {
    value.is_some_and(|v| v > level)
}

/// Long when `long` holds, short when `short` holds; short wins if both do.
fn decide(long: bool, short: bool) -> Signal {
    if short {
        Signal::Short
    } else if long {
        Signal::Long
    } else {
        Signal::Flat
    }
}

impl SignalProvider for Strategy {
    fn generate(&self, series: &EnrichedSeries) -> Result<Vec<Signal>, StratevalError> {
        let bars = series.bars();
        let signals = match self {
            Strategy::Breakout => {
                let high = series.column(Column::DonchianHigh)?;
                let low = series.column(Column::DonchianLow)?;
                bars.iter()
                    .enumerate()
                    .map(|(i, b)| decide(above(b.close, high[i]), below(b.close, low[i])))
                    .collect()
            }
            Strategy::FilteredBreakout {
                overbought,
                oversold,
            } => {
                let high = series.column(Column::DonchianHigh)?;
                let low = series.column(Column::DonchianLow)?;
                let rsi = series.column(Column::Rsi)?;
                bars.iter()
                    .enumerate()
                    .map(|(i, b)| {
                        let long = above(b.close, high[i]) && below_level(rsi[i], *overbought);
                        let short = below(b.close, low[i]) && above_level(rsi[i], *oversold);
                        decide(long, short)
                    })
                    .collect()
            }
            Strategy::RegimeInference => {
                let states = series.column(Column::RegimeState)?;
                let mut out = Vec::with_capacity(states.len());
                for i in 0..states.len() {
                    let signal = match (i.checked_sub(1).and_then(|p| states[p]), states[i]) {
                        (Some(prev), Some(cur)) => decide(cur > prev, cur < prev),
                        _ => Signal::Flat,
                    };
                    out.push(signal);
                }
                out
            }
            Strategy::TrendSmoothing => {
                let trend = series.column(Column::SmoothedPrice)?;
                bars.iter()
                    .enumerate()
                    .map(|(i, b)| decide(above(b.close, trend[i]), below(b.close, trend[i])))
                    .collect()
            }
        };
        Ok(signals)
    }
}

/// A named signal provider competing in a selection run.
pub struct Candidate {
    pub name: String,
    pub provider: Box<dyn SignalProvider>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, provider: impl SignalProvider + 'static) -> Self {
        Self {
            name: name.into(),
            provider: Box::new(provider),
        }
    }

    pub fn from_strategy(strategy: Strategy) -> Self {
        Candidate::new(strategy.display_name(), strategy)
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate").field("name", &self.name).finish()
    }
}

/// The four built-in rules in their canonical order.
pub fn default_candidates() -> Vec<Candidate> {
    Strategy::KEYS
        .iter()
        .filter_map(|k| Strategy::from_key(k))
        .map(Candidate::from_strategy)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> EnrichedSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    c,
                )
            })
            .collect();
        EnrichedSeries::new(bars)
    }

    fn ints(signals: &[Signal]) -> Vec<i64> {
        signals.iter().map(|s| s.as_i64()).collect()
    }

    #[test]
    fn breakout_signals() {
        let s = series(&[100.0, 111.0, 89.0, 100.0])
            .with_column(
                Column::DonchianHigh,
                vec![None, Some(110.0), Some(110.0), Some(110.0)],
            )
            .unwrap()
            .with_column(
                Column::DonchianLow,
                vec![None, Some(90.0), Some(90.0), Some(90.0)],
            )
            .unwrap();
        let out = Strategy::Breakout.generate(&s).unwrap();
        assert_eq!(ints(&out), vec![0, 1, -1, 0]);
    }

    #[test]
    fn breakout_requires_channel_columns() {
        let s = series(&[100.0]);
        let err = Strategy::Breakout.generate(&s).unwrap_err();
        assert!(matches!(err, StratevalError::MissingColumn { .. }));
    }

    #[test]
    fn filtered_breakout_respects_rsi_gates() {
        let s = series(&[111.0, 111.0, 89.0, 89.0])
            .with_column(Column::DonchianHigh, vec![Some(110.0); 4])
            .unwrap()
            .with_column(Column::DonchianLow, vec![Some(90.0); 4])
            .unwrap()
            .with_column(
                Column::Rsi,
                vec![Some(65.0), Some(75.0), Some(35.0), Some(25.0)],
            )
            .unwrap();
        let strategy = Strategy::from_key("filtered_breakout").unwrap();
        let out = strategy.generate(&s).unwrap();
        assert_eq!(ints(&out), vec![1, 0, -1, 0]);
    }

    #[test]
    fn filtered_breakout_missing_rsi_is_flat() {
        let s = series(&[111.0])
            .with_column(Column::DonchianHigh, vec![Some(110.0)])
            .unwrap()
            .with_column(Column::DonchianLow, vec![Some(90.0)])
            .unwrap()
            .with_column(Column::Rsi, vec![None])
            .unwrap();
        let out = Strategy::FilteredBreakout {
            overbought: 70.0,
            oversold: 30.0,
        }
        .generate(&s)
        .unwrap();
        assert_eq!(ints(&out), vec![0]);
    }

    #[test]
    fn regime_signals_on_state_transitions() {
        let s = series(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0])
            .with_column(
                Column::RegimeState,
                vec![Some(0.0), Some(2.0), Some(2.0), Some(1.0), None, Some(1.0)],
            )
            .unwrap();
        let out = Strategy::RegimeInference.generate(&s).unwrap();
        assert_eq!(ints(&out), vec![0, 1, 0, -1, 0, 0]);
    }

    #[test]
    fn trend_smoothing_signals() {
        let s = series(&[10.0, 12.0, 9.0])
            .with_column(
                Column::SmoothedPrice,
                vec![Some(10.0), Some(11.0), Some(10.0)],
            )
            .unwrap();
        let out = Strategy::TrendSmoothing.generate(&s).unwrap();
        assert_eq!(ints(&out), vec![0, 1, -1]);
    }

    #[test]
    fn default_candidates_in_order() {
        let names: Vec<String> = default_candidates().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "Donchian Breakout",
                "Donchian + RSI",
                "HMM Strategy",
                "Kalman Filter"
            ]
        );
    }

    #[test]
    fn unknown_key() {
        assert!(Strategy::from_key("momentum").is_none());
    }

    #[test]
    fn required_columns_per_rule() {
        assert_eq!(
            Strategy::TrendSmoothing.required_columns(),
            &[Column::SmoothedPrice]
        );
        assert_eq!(
            Strategy::from_key("filtered_breakout")
                .unwrap()
                .required_columns()
                .len(),
            3
        );
    }
}
