//! relex Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Parse provider configuration
    pub parser: ParserConfig,

    /// Extraction engine configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
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

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = self.extraction.min_confidence;
        if !(0.0..=1.0).contains(&min) {
            return Err(ConfigError::InvalidValue {
                key: "extraction.min_confidence".to_string(),
                value: min.to_string(),
            });
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Parser
        if let Ok(program) = std::env::var("RELEX_PARSER_CMD") {
            self.parser.program = Some(program);
        }
        if let Ok(args) = std::env::var("RELEX_PARSER_ARGS") {
            self.parser.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Ok(path) = std::env::var("RELEX_CONLLU_PATH") {
            self.parser.conllu_path = Some(PathBuf::from(path));
        }

        // Extraction
        if let Ok(value) = std::env::var("RELEX_MIN_CONFIDENCE") {
            self.extraction.min_confidence =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RELEX_MIN_CONFIDENCE".to_string(),
                    value,
                })?;
        }
        if let Ok(patterns) = std::env::var("RELEX_DISABLED_PATTERNS") {
            self.extraction.disabled_patterns = patterns
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(value) = std::env::var("LOG_JSON") {
            self.logging.json_format = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOG_JSON".to_string(),
                value,
            })?;
        }

        self.validate()
    }
}

/// Parse provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    /// External dependency parser emitting CoNLL-U on stdout
    pub program: Option<String>,

    /// Arguments passed to the parser program
    pub args: Vec<String>,

    /// Pre-parsed CoNLL-U file served instead of running a parser
    pub conllu_path: Option<PathBuf>,
}

/// Extraction engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Relations scoring below this are dropped after deduplication
    pub min_confidence: f32,

    /// Pattern names to leave out of the pattern library
    pub disabled_patterns: Vec<String>,

    /// Extra first names inferred as male by the pronoun resolver
    pub male_names: Vec<String>,

    /// Extra first names inferred as female by the pronoun resolver
    pub female_names: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
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
