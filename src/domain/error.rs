//! Domain error types.

/// Top-level error type for strateval.
#[derive(Debug, thiserror::Error)]
pub enum StratevalError {
    #[error("series length mismatch: {bars} price bars but {signals} signals")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("invalid signal {value} at index {index}: expected -1, 0 or 1")]
    InvalidSignal { index: usize, value: i64 },

    #[error("non-positive close {close} at index {index}")]
    NonPositivePrice { index: usize, close: f64 },

    #[error("dates not strictly increasing at index {index}")]
    UnorderedDates { index: usize },

    #[error("missing indicator column '{column}'")]
    MissingColumn { column: String },

    #[error("indicator column '{column}' has {actual} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load price data: {reason}")]
    DataLoad { reason: String },

    #[error("no price data in {path}")]
    NoData { path: String },

    #[error("failed to write report: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StratevalError {
    /// True for errors caused by malformed price or signal input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StratevalError::LengthMismatch { .. }
                | StratevalError::InvalidSignal { .. }
                | StratevalError::NonPositivePrice { .. }
                | StratevalError::UnorderedDates { .. }
        )
    }
}

impl From<&StratevalError> for std::process::ExitCode {
    fn from(err: &StratevalError) -> Self {
        let code: u8 = match err {
            StratevalError::Io(_) | StratevalError::Report { .. } => 1,
            StratevalError::ConfigParse { .. }
            | StratevalError::ConfigMissing { .. }
            | StratevalError::ConfigInvalid { .. } => 2,
            StratevalError::LengthMismatch { .. }
            | StratevalError::InvalidSignal { .. }
            | StratevalError::NonPositivePrice { .. }
            | StratevalError::UnorderedDates { .. } => 4,
            StratevalError::MissingColumn { .. }
            | StratevalError::ColumnLength { .. }
            | StratevalError::DataLoad { .. }
            | StratevalError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
