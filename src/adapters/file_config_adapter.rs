//! INI file configuration adapter.

use crate::domain::error::SwingscanError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn new() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SwingscanError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SwingscanError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SwingscanError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SwingscanError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Overwrite a single value; command-line flags take precedence over the file.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.config.set(section, key, Some(value.into()));
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl Default for FileConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
source = csv
csv_dir = /var/lib/swingscan/bars

[backtest]
symbols = TCS.NS, MGL.NS
stop_loss_percent = 15
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
        assert_eq!(
            adapter.get_string("backtest", "symbols"),
            Some("TCS.NS, MGL.NS".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[reversal]\nticker = TCS.NS\n").unwrap();
        assert_eq!(adapter.get_string("reversal", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[reversal]\nnum_reversals = 5\n").unwrap();
        assert_eq!(adapter.get_int("reversal", "num_reversals", 0), 5);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[reversal]\nnum_reversals = abc\n").unwrap();
        assert_eq!(adapter.get_int("reversal", "num_reversals", 3), 3);
        assert_eq!(adapter.get_int("reversal", "missing", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[snapshot]\ninvestment = 100000.5\n").unwrap();
        assert_eq!(adapter.get_double("snapshot", "investment", 0.0), 100000.5);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[reversal]\ntolerance_percentage = lots\n").unwrap();
        assert_eq!(adapter.get_double("reversal", "tolerance_percentage", 3.0), 3.0);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[volume]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("volume", "a", false));
        assert!(adapter.get_bool("volume", "b", false));
        assert!(adapter.get_bool("volume", "c", false));
        assert!(!adapter.get_bool("volume", "d", true));
        assert!(!adapter.get_bool("volume", "e", true));
        assert!(!adapter.get_bool("volume", "f", true));
        assert!(adapter.get_bool("volume", "missing", true));
    }

    #[test]
    fn set_overrides_file_value() {
        let mut adapter =
            FileConfigAdapter::from_string("[backtest]\ntarget_percent = 10\n").unwrap();
        adapter.set("backtest", "target_percent", "12.5");
        adapter.set("web", "listen", "0.0.0.0:9000");
        assert_eq!(adapter.get_double("backtest", "target_percent", 0.0), 12.5);
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("0.0.0.0:9000".to_string())
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[logging]\nfilter = swingscan=debug\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("logging", "filter"),
            Some("swingscan=debug".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(SwingscanError::ConfigParse { .. })));
    }
}
