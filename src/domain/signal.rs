//! Directional signals.

use crate::domain::error::StratevalError;
use std::fmt;

/// Per-bar directional stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn as_i64(self) -> i64 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    /// Multiplier applied to a price return.
    pub fn exposure(self) -> f64 {
        self.as_i64() as f64
    }
}

impl TryFrom<i64> for Signal {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(other),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// Convert a raw integer series into signals, rejecting anything outside
/// {-1, 0, 1}.
pub fn parse_signals(raw: &[i64]) -> Result<Vec<Signal>, StratevalError> {
    raw.iter()
        .enumerate()
        .map(|(index, &value)| {
            Signal::try_from(value).map_err(|value| StratevalError::InvalidSignal { index, value })
        })
        .collect()
}
