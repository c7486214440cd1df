//! Input validation for price and signal series.
//!
//! Runs before any evaluation so the engines can assume aligned series,
//! positive closes and strictly increasing dates.

use crate::domain::error::StratevalError;
use crate::domain::price::PriceBar;
use crate::domain::signal::Signal;

pub fn validate_prices(bars: &[PriceBar]) -> Result<(), StratevalError> {
    for (index, bar) in bars.iter().enumerate() {
        if !(bar.close.is_finite() && bar.close > 0.0) {
            return Err(StratevalError::NonPositivePrice {
                index,
                close: bar.close,
            });
        }
    }
    if let Some(index) = bars
        .windows(2)
        .position(|w| w[1].date <= w[0].date)
    {
        return Err(StratevalError::UnorderedDates { index: index + 1 });
    }
    Ok(())
}

pub fn validate_alignment(bars: &[PriceBar], signals: &[Signal]) -> Result<(), StratevalError> {
    if bars.len() != signals.len() {
        return Err(StratevalError::LengthMismatch {
            bars: bars.len(),
            signals: signals.len(),
        });
    }
    Ok(())
}

/// Full pre-evaluation check for one strategy's inputs.
pub fn validate_inputs(bars: &[PriceBar], signals: &[Signal]) -> Result<(), StratevalError> {
    validate_alignment(bars, signals)?;
    validate_prices(bars)
}
