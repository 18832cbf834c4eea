//! Enumerator configuration
//!
//! Loaded from JSON; every field has a default so an empty object is valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{EnumeratorError, EnumeratorResult};
use crate::observability::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    /// Extend leading-field assignments into compound assignments (default: true)
    #[serde(default = "default_true")]
    pub extend_compound: bool,

    /// Sort produced plans by indexedness (default: true)
    #[serde(default = "default_true")]
    pub normalize_output: bool,

    /// Minimum log severity: trace, info, warn, error or fatal (default: "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            extend_compound: true,
            normalize_output: true,
            log_level: default_log_level(),
        }
    }
}

impl EnumeratorConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> EnumeratorResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EnumeratorError::invalid_config(format!("Failed to read config: {}", e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> EnumeratorResult<Self> {
        let config: EnumeratorConfig = serde_json::from_str(content)
            .map_err(|e| EnumeratorError::invalid_config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EnumeratorResult<()> {
        self.log_severity().map(|_| ())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> EnumeratorResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            EnumeratorError::invalid_config(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EnumeratorConfig::from_json("{}").unwrap();
        assert_eq!(config, EnumeratorConfig::default());
        assert!(config.extend_compound);
        assert!(config.normalize_output);
        assert_eq!(config.log_severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_overrides() {
        let config =
            EnumeratorConfig::from_json(r#"{"extend_compound": false, "log_level": "TRACE"}"#)
                .unwrap();
        assert!(!config.extend_compound);
        assert!(config.normalize_output);
        assert_eq!(config.log_severity().unwrap(), Severity::Trace);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = EnumeratorConfig::from_json(r#"{"log_level": "loud"}"#).unwrap_err();
        assert_eq!(err.code().code(), "AERO_ENUM_INVALID_CONFIG");
        assert!(err.message().contains("loud"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EnumeratorConfig::from_json("{not json").unwrap_err();
        assert!(err.message().contains("Invalid config JSON"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"normalize_output": false}}"#).unwrap();

        let config = EnumeratorConfig::load(file.path()).unwrap();
        assert!(!config.normalize_output);
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = EnumeratorConfig::load(Path::new("/nonexistent/planenum.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
