//! Configuration validation.
//!
//! Validates all config fields before an evaluation runs.

use crate::domain::error::StratevalError;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    validate_data_path(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    validate_number(config, "backtest", "periods_per_year")?;
    validate_flag(config, "backtest", "parallel")?;
    validate_number(config, "filtered_breakout", "overbought")?;
    validate_number(config, "filtered_breakout", "oversold")?;
    validate_periods_per_year(config)?;
    validate_strategy_keys(config)?;
    validate_rsi_thresholds(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StratevalError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(StratevalError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, StratevalError> {
    match config.get_string("data", field) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| StratevalError::ConfigInvalid {
                section: "data".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}

/// Boolean spellings accepted in config files.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A present key must parse; an absent one falls back to its default.
fn validate_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), StratevalError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().parse::<f64>().is_err() => Err(StratevalError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a number, got '{}'", s.trim()),
        }),
        _ => Ok(()),
    }
}

fn validate_flag(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), StratevalError> {
    match config.get_string(section, key) {
        Some(s) if parse_flag(&s).is_none() => Err(StratevalError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected true or false, got '{}'", s.trim()),
        }),
        _ => Ok(()),
    }
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    let value = config.get_double("backtest", "periods_per_year", 252.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(StratevalError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be positive".to_string(),
        });
    }
    Ok(())
}

/// Split a comma-separated strategy list into trimmed lowercase keys.
pub fn parse_strategy_keys(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_strategy_keys(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    let Some(value) = config.get_string("backtest", "strategies") else {
        return Ok(());
    };
    let keys = parse_strategy_keys(&value);
    if keys.is_empty() {
        return Err(StratevalError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "strategies".to_string(),
            reason: "at least one strategy is required".to_string(),
        });
    }
    if let Some(unknown) = keys.iter().find(|k| Strategy::from_key(k).is_none()) {
        return Err(StratevalError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "strategies".to_string(),
            reason: format!(
                "unknown strategy '{}', expected one of: {}",
                unknown,
                Strategy::KEYS.join(", ")
            ),
        });
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), StratevalError> {
    let overbought = config.get_double("filtered_breakout", "overbought", 70.0);
    let oversold = config.get_double("filtered_breakout", "oversold", 30.0);
    if !(0.0..=100.0).contains(&overbought) || !(0.0..=100.0).contains(&oversold) {
        return Err(StratevalError::ConfigInvalid {
            section: "filtered_breakout".to_string(),
            key: "overbought".to_string(),
            reason: "RSI thresholds must be between 0 and 100".to_string(),
        });
    }
    if oversold >= overbought {
        return Err(StratevalError::ConfigInvalid {
            section: "filtered_breakout".to_string(),
            key: "oversold".to_string(),
            reason: "oversold must be below overbought".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_full_config() {
        let c = config(
            "[data]\npath = p.csv\nstart_date = 2020-01-01\nend_date = 2024-12-31\n\
             [backtest]\nstrategies = breakout, trend\nperiods_per_year = 252\n\
             [filtered_breakout]\noverbought = 75\noversold = 25\n",
        );
        assert!(validate_data_config(&c).is_ok());
        assert!(validate_backtest_config(&c).is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        let c = config("[data]\npath = p.csv\n");
        assert!(validate_data_config(&c).is_ok());
        assert!(validate_backtest_config(&c).is_ok());
    }

    #[test]
    fn missing_path() {
        let err = validate_data_config(&config("[data]\n")).unwrap_err();
        assert!(matches!(err, StratevalError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn bad_date_format() {
        let err = validate_data_config(&config("[data]\npath = p.csv\nstart_date = 2020/01/01\n"))
            .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_after_end() {
        let err = validate_data_config(&config(
            "[data]\npath = p.csv\nstart_date = 2024-01-01\nend_date = 2023-01-01\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { .. }));
    }

    #[test]
    fn non_positive_periods() {
        let err = validate_backtest_config(&config("[backtest]\nperiods_per_year = 0\n"))
            .unwrap_err();
        assert!(
            matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "periods_per_year")
        );
    }

    #[test]
    fn unknown_strategy_key() {
        let err = validate_backtest_config(&config("[backtest]\nstrategies = breakout, momentum\n"))
            .unwrap_err();
        assert!(
            matches!(err, StratevalError::ConfigInvalid { reason, .. } if reason.contains("momentum"))
        );
    }

    #[test]
    fn empty_strategy_list() {
        let err = validate_backtest_config(&config("[backtest]\nstrategies = ,\n")).unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "strategies"));
    }

    #[test]
    fn inverted_rsi_thresholds() {
        let err = validate_backtest_config(&config(
            "[filtered_breakout]\noverbought = 30\noversold = 70\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "oversold"));
    }

    #[test]
    fn rsi_threshold_out_of_range() {
        let err = validate_backtest_config(&config("[filtered_breakout]\noverbought = 120\n"))
            .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { .. }));
    }

    #[test]
    fn non_numeric_periods() {
        let err = validate_backtest_config(&config("[backtest]\nperiods_per_year = abc\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            StratevalError::ConfigInvalid { key, reason, .. }
                if key == "periods_per_year" && reason.contains("abc")
        ));
    }

    #[test]
    fn non_numeric_rsi_threshold() {
        let err = validate_backtest_config(&config("[filtered_breakout]\noversold = low\n"))
            .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "oversold"));
    }

    #[test]
    fn unparseable_parallel_flag() {
        let err = validate_backtest_config(&config("[backtest]\nparallel = sometimes\n"))
            .unwrap_err();
        assert!(matches!(err, StratevalError::ConfigInvalid { key, .. } if key == "parallel"));
        assert!(validate_backtest_config(&config("[backtest]\nparallel = off\n")).is_ok());
    }

    #[test]
    fn flag_spellings() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn parse_keys_trims_and_lowercases() {
        assert_eq!(
            parse_strategy_keys(" Breakout ,TREND,, regime"),
            vec!["breakout", "trend", "regime"]
        );
    }
}
