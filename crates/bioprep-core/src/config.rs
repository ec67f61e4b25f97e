//! bioprep configuration management
//!
//! Handles configuration from a TOML file and environment variables with
//! defaults matching the historical behaviour of the preparation scripts
//! (minimum token length 4, blacklist cap 100, 85/10/5 split, seed 42).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PrepConfig {
    /// Blacklist construction parameters
    pub blacklist: BlacklistConfig,

    /// Train/valid/test split parameters
    pub split: SplitConfig,
}

/// Parameters for blacklist construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    /// Minimum token length (in characters) for a blacklist candidate
    pub min_token_length: usize,

    /// Maximum number of blacklist entries kept (most frequent first)
    pub cap: usize,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            min_token_length: 4,
            cap: 100,
        }
    }
}

/// Parameters for corpus partitioning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of documents assigned to the training partition
    pub train_fraction: f64,

    /// Fraction of documents assigned to the validation partition
    pub valid_fraction: f64,

    /// Shuffle seed, so that repeated runs produce the same partitions
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.85,
            valid_fraction: 0.10,
            seed: 42,
        }
    }
}

impl PrepConfig {
    /// Load configuration overrides from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(len) = std::env::var("BIOPREP_MIN_TOKEN_LENGTH") {
            config.blacklist.min_token_length =
                len.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "BIOPREP_MIN_TOKEN_LENGTH".to_string(),
                    value: len,
                })?;
        }
        if let Ok(cap) = std::env::var("BIOPREP_BLACKLIST_CAP") {
            config.blacklist.cap = cap.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BIOPREP_BLACKLIST_CAP".to_string(),
                value: cap,
            })?;
        }
        if let Ok(seed) = std::env::var("BIOPREP_SPLIT_SEED") {
            config.split.seed = seed.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BIOPREP_SPLIT_SEED".to_string(),
                value: seed,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split.train_fraction <= 0.0
            || self.split.valid_fraction < 0.0
            || self.split.train_fraction + self.split.valid_fraction >= 1.0
        {
            return Err(ConfigError::InvalidValue {
                key: "split.train_fraction/valid_fraction".to_string(),
                value: format!(
                    "{} + {}",
                    self.split.train_fraction, self.split.valid_fraction
                ),
            });
        }
        if self.blacklist.cap == 0 {
            return Err(ConfigError::InvalidValue {
                key: "blacklist.cap".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_script_behaviour() {
        let config = PrepConfig::default();
        assert_eq!(config.blacklist.min_token_length, 4);
        assert_eq!(config.blacklist.cap, 100);
        assert_eq!(config.split.seed, 42);
        assert!((config.split.train_fraction - 0.85).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bioprep.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[blacklist]\nmin_token_length = 6").unwrap();

        let config = PrepConfig::from_file(&path).unwrap();
        assert_eq!(config.blacklist.min_token_length, 6);
        // untouched sections keep their defaults
        assert_eq!(config.blacklist.cap, 100);
        assert_eq!(config.split.seed, 42);
    }

    #[test]
    fn test_invalid_fractions_rejected() {
        let config = PrepConfig {
            split: SplitConfig {
                train_fraction: 0.95,
                valid_fraction: 0.10,
                seed: 42,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = PrepConfig::from_file("/nonexistent/bioprep.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
