//! Job configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `REVIEW_ETL_*` environment variables. The binary applies command-line
//! overrides last and calls [`JobConfig::validate`] on the merged result.

use crate::error::{EtlError, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const ENV_INPUT_PATH: &str = "REVIEW_ETL_INPUT_PATH";
pub const ENV_PROCESSED_PATH: &str = "REVIEW_ETL_PROCESSED_PATH";
pub const ENV_ANALYTICS_PATH: &str = "REVIEW_ETL_ANALYTICS_PATH";
pub const ENV_WRITE_MODE: &str = "REVIEW_ETL_WRITE_MODE";

/// What happens to part files already present at a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// New part files are added beside existing ones
    #[default]
    Append,
    /// Existing part files and the commit marker are removed first
    Overwrite,
}

impl FromStr for WriteMode {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(WriteMode::Append),
            "overwrite" => Ok(WriteMode::Overwrite),
            other => Err(EtlError::Config(format!(
                "Unknown write mode '{}' (expected 'append' or 'overwrite')",
                other
            ))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Overwrite => write!(f, "overwrite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Landing zone holding the raw CSV files
    pub input_path: String,

    /// Destination of the full transformed dataset
    pub processed_path: String,

    /// Parent location of the four analytics result sets
    pub analytics_path: String,

    /// strftime pattern used to parse `review_date`
    pub date_format: String,

    /// Substituted for a missing `review_text`
    pub missing_review_text: String,

    /// Rows scanned per file when inferring column types (None = every row)
    pub infer_schema_length: Option<usize>,

    /// Upper bound on rows per part file for the processed dataset
    pub rows_per_file: usize,

    pub write_mode: WriteMode,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            input_path: "data/landing".to_string(),
            processed_path: "data/processed/processed-data".to_string(),
            analytics_path: "data/processed/analytics".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            missing_review_text: "No review text".to_string(),
            infer_schema_length: Some(1000),
            rows_per_file: 100_000,
            write_mode: WriteMode::Append,
        }
    }
}

impl JobConfig {
    /// Load a JSON config file; fields it omits keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EtlError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| EtlError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from any variable source. Empty values are ignored.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_INPUT_PATH) {
            self.input_path = v;
        }
        if let Some(v) = get(ENV_PROCESSED_PATH) {
            self.processed_path = v;
        }
        if let Some(v) = get(ENV_ANALYTICS_PATH) {
            self.analytics_path = v;
        }
        if let Some(v) = get(ENV_WRITE_MODE) {
            self.write_mode = v.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("input_path", &self.input_path),
            ("processed_path", &self.processed_path),
            ("analytics_path", &self.analytics_path),
        ] {
            if value.trim().is_empty() {
                return Err(EtlError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.rows_per_file == 0 {
            return Err(EtlError::Config("rows_per_file must be greater than 0".to_string()));
        }

        if self.infer_schema_length == Some(0) {
            return Err(EtlError::Config(
                "infer_schema_length must be greater than 0 (use null to scan every row)".to_string(),
            ));
        }

        if self.date_format.is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(EtlError::Config(format!(
                "Invalid date_format '{}'",
                self.date_format
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = JobConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.missing_review_text, "No review text");
        assert_eq!(config.write_mode, WriteMode::Append);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: JobConfig =
            serde_json::from_str(r#"{"input_path": "s3-mount/landing", "write_mode": "overwrite"}"#).unwrap();
        assert_eq!(config.input_path, "s3-mount/landing");
        assert_eq!(config.write_mode, WriteMode::Overwrite);
        assert_eq!(config.rows_per_file, 100_000);
        assert_eq!(config.infer_schema_length, Some(1000));
    }

    #[test]
    fn test_null_sample_length_means_full_scan() {
        let config: JobConfig = serde_json::from_str(r#"{"infer_schema_length": null}"#).unwrap();
        assert_eq!(config.infer_schema_length, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JobConfig::load(&path).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
        assert!(err.to_string().contains("job.json"));
    }

    #[test]
    fn test_vars_override_fields() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_INPUT_PATH, "/mnt/landing"),
            (ENV_ANALYTICS_PATH, ""),
            (ENV_WRITE_MODE, "Overwrite"),
        ]);

        let mut config = JobConfig::default();
        config
            .apply_vars(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.input_path, "/mnt/landing");
        assert_eq!(config.analytics_path, "data/processed/analytics");
        assert_eq!(config.write_mode, WriteMode::Overwrite);
    }

    #[test]
    fn test_unknown_write_mode_is_rejected() {
        assert!("replace".parse::<WriteMode>().is_err());
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = JobConfig { rows_per_file: 0, ..JobConfig::default() };
        assert!(config.validate().is_err());

        let config = JobConfig { infer_schema_length: Some(0), ..JobConfig::default() };
        assert!(config.validate().is_err());

        let config = JobConfig { date_format: "%Y-%Q".to_string(), ..JobConfig::default() };
        assert!(config.validate().is_err());

        let config = JobConfig { input_path: "  ".to_string(), ..JobConfig::default() };
        assert!(config.validate().is_err());
    }
}
