//! INI file configuration adapter.

use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| AnalysisError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AnalysisError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AnalysisError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
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
    fn from_string_parses_sharpe_section() {
        let content = r#"
[sharpe]
risk_free_rate = 0.04
sampling_frequency = day
time_zone = Europe/Zurich
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("sharpe", "sampling_frequency"),
            Some("day".to_string())
        );
        assert_eq!(
            adapter.get_string("sharpe", "time_zone"),
            Some("Europe/Zurich".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[sharpe]\nrisk_free_rate = 0\n").unwrap();
        assert_eq!(adapter.get_string("sharpe", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_are_case_insensitive_values_are_not() {
        let adapter =
            FileConfigAdapter::from_string("[Sharpe]\nTime_Zone = Asia/Tokyo\n").unwrap();
        assert_eq!(
            adapter.get_string("sharpe", "time_zone"),
            Some("Asia/Tokyo".to_string())
        );
    }

    #[test]
    fn malformed_content_is_a_parse_error() {
        let result = FileConfigAdapter::from_string("[sharpe\nrisk_free_rate = 0\n");
        assert!(matches!(result, Err(AnalysisError::ConfigParse { .. })));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[sharpe]\nrisk_free_rate = 0.02\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("sharpe", "risk_free_rate"),
            Some("0.02".to_string())
        );
    }

    #[test]
    fn from_file_returns_parse_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        match result {
            Err(AnalysisError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/config.ini")
            }
            _ => panic!("expected ConfigParse error"),
        }
    }
}
