//! Closed round-trip trades reconstructed from signal transitions.

use crate::domain::error::StratevalError;
use crate::domain::price::PriceBar;
use crate::domain::signal::Signal;
use crate::domain::validation::validate_alignment;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("long"),
            Direction::Short => f.write_str("short"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub direction: Direction,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub ret: f64,
}

impl Trade {
    fn close(direction: Direction, entry: (usize, &PriceBar), exit: (usize, &PriceBar)) -> Self {
        let (entry_index, entry_bar) = entry;
        let (exit_index, exit_bar) = exit;
        let gross = (exit_bar.close - entry_bar.close) / entry_bar.close;
        let ret = match direction {
            Direction::Long => gross,
            Direction::Short => -gross,
        };
        Trade {
            direction,
            entry_index,
            exit_index,
            entry_date: entry_bar.date,
            exit_date: exit_bar.date,
            entry_price: entry_bar.close,
            exit_price: exit_bar.close,
            ret,
        }
    }
}

/// Walk the signals with a flat/long/short state machine and emit every
/// closed trade. A reversal closes and reopens on the same bar at the same
/// close. A position still open at the last bar is not emitted.
pub fn segment_trades(
    bars: &[PriceBar],
    signals: &[Signal],
) -> Result<Vec<Trade>, StratevalError> {
    validate_alignment(bars, signals)?;
    let mut trades = Vec::new();
    let mut open: Option<(Direction, usize)> = None;

    for (i, (bar, signal)) in bars.iter().zip(signals).enumerate() {
        let target = match signal {
            Signal::Long => Direction::Long,
            Signal::Short => Direction::Short,
            Signal::Flat => continue,
        };
        match open {
            Some((direction, _)) if direction == target => {}
            Some((direction, entry)) => {
                trades.push(Trade::close(direction, (entry, &bars[entry]), (i, bar)));
                open = Some((target, i));
            }
            None => open = Some((target, i)),
        }
    }

    Ok(trades)
}
