//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `MATCHBACK_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/matchback/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: the caller gets a warning and the
//! compiled defaults. A file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MATCHBACK_CONFIG";

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Classification thresholds (optional)
    #[serde(default)]
    pub rules: RulesConfig,

    /// Sanitizer leak-check settings (optional)
    #[serde(default)]
    pub privacy: PrivacyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Thresholds used by the pattern and customer-type classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Minimum visit count for a "regular customer" pattern
    #[serde(default = "default_pattern_min_visits")]
    pub pattern_min_visits: u32,

    /// Smallest signup-to-visit gap (days) counted as a new visitor
    #[serde(default = "default_new_visitor_min_days")]
    pub new_visitor_min_days: f64,

    /// Largest signup-to-visit gap (days) counted as a new visitor
    #[serde(default = "default_new_visitor_max_days")]
    pub new_visitor_max_days: f64,

    /// Signup-to-visit gap (years of 365 days) at which a visit is a winback
    #[serde(default = "default_winback_min_years")]
    pub winback_min_years: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            pattern_min_visits: default_pattern_min_visits(),
            new_visitor_min_days: default_new_visitor_min_days(),
            new_visitor_max_days: default_new_visitor_max_days(),
            winback_min_years: default_winback_min_years(),
        }
    }
}

/// Extra leak-check patterns on top of the built-in sensitive field list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivacyConfig {
    #[serde(default)]
    pub extra_sensitive_patterns: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pattern_min_visits() -> u32 {
    3
}

fn default_new_visitor_min_days() -> f64 {
    1.0
}

fn default_new_visitor_max_days() -> f64 {
    30.0
}

fn default_winback_min_years() -> f64 {
    5.0
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve and load configuration, falling back to defaults when no file exists
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file configured, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject thresholds that would make classification meaningless
    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        for (name, value) in [
            ("new_visitor_min_days", rules.new_visitor_min_days),
            ("new_visitor_max_days", rules.new_visitor_max_days),
            ("winback_min_years", rules.winback_min_years),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!(
                    "rules.{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        if rules.new_visitor_min_days > rules.new_visitor_max_days {
            return Err(Error::Config(format!(
                "rules.new_visitor_min_days ({}) exceeds rules.new_visitor_max_days ({})",
                rules.new_visitor_min_days, rules.new_visitor_max_days
            )));
        }
        if rules.winback_min_years <= 0.0 {
            return Err(Error::Config(format!(
                "rules.winback_min_years must be positive, got {}",
                rules.winback_min_years
            )));
        }
        if self
            .privacy
            .extra_sensitive_patterns
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(Error::Config(
                "privacy.extra_sensitive_patterns contains an empty pattern".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the config file path following the documented priority order
///
/// Returns `None` only when no candidate location can be determined.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("matchback").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_default_rules_match_documented_thresholds() {
        let rules = RulesConfig::default();
        assert_eq!(rules.pattern_min_visits, 3);
        assert_eq!(rules.new_visitor_min_days, 1.0);
        assert_eq!(rules.new_visitor_max_days, 30.0);
        assert_eq!(rules.winback_min_years, 5.0);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_partial_rules_section_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str("[rules]\npattern_min_visits = 4\n").unwrap();
        assert_eq!(config.rules.pattern_min_visits, 4);
        assert_eq!(config.rules.new_visitor_max_days, 30.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_inverted_new_visitor_window_rejected() {
        let result = TomlConfig::from_toml_str(
            "[rules]\nnew_visitor_min_days = 40.0\nnew_visitor_max_days = 30.0\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_extra_pattern_rejected() {
        let result =
            TomlConfig::from_toml_str("[privacy]\nextra_sensitive_patterns = [\"ssn\", \" \"]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_argument_wins() {
        let path = PathBuf::from("/tmp/matchback-cli.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
