//! TOML configuration for the `irpf` binary.
//!
//! Every key is optional:
//!
//! ```toml
//! [engine]
//! deduction_policy = "threshold"   # or "presence"
//! rate_precision = "standard"      # or "legacy"
//!
//! [logging]
//! level = "info"
//! file = "irpf.log"
//! ```
//!
//! Command-line flags win over the file, which wins over the defaults.

use std::path::{Path, PathBuf};

use irpf_core::{DeductionPolicy, EngineConfig, RatePrecision};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Log filter used when neither the command line nor the file sets one and
/// `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `None` defers to `RUST_LOG`.
    pub level: Option<String>,
    /// Log records are appended here as well as written to stderr.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line. `None` leaves the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub deduction_policy: Option<DeductionPolicy>,
    pub rate_precision: Option<RatePrecision>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(
        mut self,
        overrides: Overrides,
    ) -> Self {
        if let Some(policy) = overrides.deduction_policy {
            self.engine.deduction_policy = policy;
        }
        if let Some(precision) = overrides.rate_precision {
            self.engine.rate_precision = precision;
        }
        if overrides.log_level.is_some() {
            self.logging.level = overrides.log_level;
        }
        if overrides.log_file.is_some() {
            self.logging.file = overrides.log_file;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FULL_TOML: &str = r#"
[engine]
deduction_policy = "presence"
rate_precision = "legacy"

[logging]
level = "debug"
file = "irpf.log"
"#;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.deduction_policy, DeductionPolicy::Threshold);
        assert_eq!(config.engine.rate_precision, RatePrecision::Standard);
    }

    #[test]
    fn full_file_sets_every_key() {
        let config = AppConfig::from_toml_str(FULL_TOML).unwrap();

        assert_eq!(config.engine.deduction_policy, DeductionPolicy::Presence);
        assert_eq!(config.engine.rate_precision, RatePrecision::Legacy);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.file, Some(PathBuf::from("irpf.log")));
    }

    #[test]
    fn partial_engine_table_keeps_other_defaults() {
        let config = AppConfig::from_toml_str("[engine]\nrate_precision = \"legacy\"\n").unwrap();

        assert_eq!(config.engine.deduction_policy, DeductionPolicy::Threshold);
        assert_eq!(config.engine.rate_precision, RatePrecision::Legacy);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = AppConfig::from_toml_str("[engine]\ndeduction_policy = \"largest\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let result = AppConfig::from_toml_str("[logging]\nlevle = \"debug\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let config = AppConfig::from_toml_str(FULL_TOML).unwrap();

        let merged = config.with_overrides(Overrides {
            deduction_policy: Some(DeductionPolicy::Threshold),
            log_level: Some("warn".to_string()),
            ..Overrides::default()
        });

        assert_eq!(merged.engine.deduction_policy, DeductionPolicy::Threshold);
        assert_eq!(merged.engine.rate_precision, RatePrecision::Legacy);
        assert_eq!(merged.logging.level.as_deref(), Some("warn"));
        assert_eq!(merged.logging.file, Some(PathBuf::from("irpf.log")));
    }

    #[test]
    fn load_optional_without_path_is_default() {
        let config = AppConfig::load_optional(None).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let result = AppConfig::load(Path::new("no/such/irpf.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
