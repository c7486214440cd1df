//! INI file configuration adapter.

use crate::domain::config_validation::parse_flag;
use crate::domain::error::StratevalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratevalError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| StratevalError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, StratevalError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| StratevalError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
path = prices/tsla.csv
start_date = 2020-01-01

[backtest]
strategies = breakout, trend
periods_per_year = 252
parallel = off

[filtered_breakout]
overbought = 72.5
oversold = low
"#;

    fn sample() -> FileConfigAdapter {
        FileConfigAdapter::from_string(SAMPLE).unwrap()
    }

    #[test]
    fn reads_strings_by_section() {
        let c = sample();
        assert_eq!(c.get_string("data", "path").as_deref(), Some("prices/tsla.csv"));
        assert_eq!(
            c.get_string("backtest", "strategies").as_deref(),
            Some("breakout, trend")
        );
        assert_eq!(c.get_string("data", "end_date"), None);
        assert_eq!(c.get_string("report", "output_dir"), None);
    }

    #[test]
    fn doubles_fall_back_on_missing_or_garbage() {
        let c = sample();
        assert_eq!(c.get_double("filtered_breakout", "overbought", 70.0), 72.5);
        assert_eq!(c.get_double("filtered_breakout", "oversold", 30.0), 30.0);
        assert_eq!(c.get_double("backtest", "periods_per_year", 0.0), 252.0);
        assert_eq!(c.get_double("backtest", "missing", 1.5), 1.5);
    }

    #[test]
    fn flags() {
        let c = sample();
        assert!(!c.get_bool("backtest", "parallel", true));
        assert!(c.get_bool("backtest", "missing", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[report]\noutput_dir = /tmp/results\n").unwrap();
        let c = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            c.get_string("report", "output_dir").as_deref(),
            Some("/tmp/results")
        );
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/strateval.ini").unwrap_err();
        assert!(
            matches!(err, StratevalError::ConfigParse { file, .. } if file.ends_with("strateval.ini"))
        );
    }
}
