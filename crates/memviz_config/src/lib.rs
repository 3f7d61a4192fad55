//! Analyzer configuration
//!
//! Defaults can be overridden from `MEMVIZ_*` environment variables and, with
//! the `toml-config` feature, from a TOML file.

use memviz_arch::Architecture;
use memviz_layout::{CACHE_LINE_SIZE, LayoutOptions, UnknownTypePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

pub const ENV_ARCH: &str = "MEMVIZ_ARCH";
pub const ENV_CACHE_LINE_SIZE: &str = "MEMVIZ_CACHE_LINE_SIZE";
pub const ENV_STRICT: &str = "MEMVIZ_STRICT";
pub const ENV_MAX_BLOCKS: &str = "MEMVIZ_MAX_BLOCKS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cache line size must be a non-zero power of two, got {0}")]
    InvalidCacheLineSize(u32),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "toml-config")]
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[cfg(feature = "toml-config")]
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("TOML support not enabled. Enable the 'toml-config' feature.")]
    TomlDisabled,
}

/// Settings for a layout analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Target architecture when the caller does not pick one
    pub architecture: Architecture,

    /// Cache line size in bytes
    pub cache_line_size: u32,

    /// Handling of fields whose type is outside the catalog
    pub unknown_types: UnknownTypePolicy,

    /// Above this many layout entries, display blocks are consolidated
    pub max_display_blocks: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::Amd64,
            cache_line_size: CACHE_LINE_SIZE,
            unknown_types: UnknownTypePolicy::Permissive,
            max_display_blocks: 50,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().apply_vars(|key| std::env::var(key).ok())
    }

    /// Merge with environment variables (env vars take precedence)
    pub fn merge_with_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup; unparsable values are logged
    /// and ignored.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(arch) = parse_var(&lookup, ENV_ARCH, |v| v.parse::<Architecture>()) {
            self.architecture = arch;
        }
        if let Some(size) = parse_var(&lookup, ENV_CACHE_LINE_SIZE, |v| v.parse::<u32>()) {
            self.cache_line_size = size;
        }
        if let Some(policy) = parse_var(&lookup, ENV_STRICT, parse_strict) {
            self.unknown_types = policy;
        }
        if let Some(blocks) = parse_var(&lookup, ENV_MAX_BLOCKS, |v| v.parse::<usize>()) {
            self.max_display_blocks = blocks;
        }
        self
    }

    /// Load configuration from TOML file
    #[cfg(feature = "toml-config")]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn from_file(_path: &Path) -> Result<Self, ConfigError> {
        Err(ConfigError::TomlDisabled)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "toml-config")]
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Save configuration to TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn save_to_file(&self, _path: &Path) -> Result<(), ConfigError> {
        Err(ConfigError::TomlDisabled)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_line_size == 0 || !self.cache_line_size.is_power_of_two() {
            return Err(ConfigError::InvalidCacheLineSize(self.cache_line_size));
        }
        Ok(())
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            unknown_types: self.unknown_types,
            cache_line_size: self.cache_line_size,
        }
    }
}

/// Look up `key` and parse its trimmed value, warning when it does not parse.
fn parse_var<T, E: std::fmt::Display>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Option<T> {
    let value = lookup(key)?;
    match parse(value.trim()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(%err, value = %value, "ignoring {key}");
            None
        }
    }
}

/// `MEMVIZ_STRICT` takes a boolean or a policy name (`strict`, `permissive`)
fn parse_strict(value: &str) -> Result<UnknownTypePolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(UnknownTypePolicy::Strict),
        "0" | "false" | "no" | "off" | "" => Ok(UnknownTypePolicy::Permissive),
        other => other.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.architecture, Architecture::Amd64);
        assert_eq!(config.cache_line_size, 64);
        assert_eq!(config.unknown_types, UnknownTypePolicy::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_vars() {
        let config = AnalyzerConfig::default().apply_vars(lookup(&[
            (ENV_ARCH, "386"),
            (ENV_CACHE_LINE_SIZE, "128"),
            (ENV_STRICT, "true"),
            (ENV_MAX_BLOCKS, "10"),
        ]));
        assert_eq!(config.architecture, Architecture::I386);
        assert_eq!(config.cache_line_size, 128);
        assert_eq!(config.unknown_types, UnknownTypePolicy::Strict);
        assert_eq!(config.max_display_blocks, 10);
        assert_eq!(config.layout_options().cache_line_size, 128);
    }

    #[test]
    fn test_bad_vars_are_ignored() {
        let config = AnalyzerConfig::default().apply_vars(lookup(&[
            (ENV_ARCH, "sparc"),
            (ENV_CACHE_LINE_SIZE, "lots"),
            (ENV_STRICT, "maybe"),
            (ENV_MAX_BLOCKS, "-3"),
        ]));
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_strict_var_accepts_policy_names() {
        let strict = AnalyzerConfig::default().apply_vars(lookup(&[(ENV_STRICT, " Strict ")]));
        assert_eq!(strict.unknown_types, UnknownTypePolicy::Strict);

        let relaxed = strict.apply_vars(lookup(&[(ENV_STRICT, "skip")]));
        assert_eq!(relaxed.unknown_types, UnknownTypePolicy::Permissive);

        assert_eq!(parse_strict("off"), Ok(UnknownTypePolicy::Permissive));
        assert!(parse_strict("maybe").is_err());
    }

    #[test]
    fn test_validate_line_size() {
        let config = AnalyzerConfig {
            cache_line_size: 96,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCacheLineSize(96))
        ));
    }

    #[test]
    #[cfg(feature = "toml-config")]
    fn test_config_serialization() {
        let config = AnalyzerConfig {
            architecture: Architecture::Arm64,
            unknown_types: UnknownTypePolicy::Strict,
            ..Default::default()
        };
        let encoded = toml::to_string(&config).unwrap();
        let decoded: AnalyzerConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(config, decoded);

        let partial: AnalyzerConfig = toml::from_str("architecture = \"386\"").unwrap();
        assert_eq!(partial.architecture, Architecture::I386);
        assert_eq!(partial.cache_line_size, 64);
    }

    #[test]
    #[cfg(not(feature = "toml-config"))]
    fn test_file_support_disabled() {
        assert!(matches!(
            AnalyzerConfig::from_file(Path::new("memviz.toml")),
            Err(ConfigError::TomlDisabled)
        ));
    }
}
