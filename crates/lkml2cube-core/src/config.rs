//! Configuration schema (lkml2cube.toml)

use serde::{Deserialize, Serialize};

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// YAML documents (`.yml`)
    Yaml,

    /// JSON documents (`.json`)
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Yaml
    }
}

impl OutputFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }
}

/// How cubes are split across output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One file per cube under `<dir>/cubes/`
    PerCube,

    /// A single document holding every cube
    Single,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::PerCube
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory output files are written under
    #[serde(default = "default_output_dir")]
    pub dir: std::path::PathBuf,

    /// Serialization format
    #[serde(default)]
    pub format: OutputFormat,

    /// File layout
    #[serde(default)]
    pub layout: OutputLayout,
}

fn default_output_dir() -> std::path::PathBuf {
    std::path::PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
            layout: OutputLayout::default(),
        }
    }
}

/// Translation behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Drop explores that fail to resolve instead of aborting the run
    #[serde(default)]
    pub skip_invalid_explores: bool,
}

/// Allowlist rules for views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    /// Views excluded from translation (glob patterns)
    #[serde(default)]
    pub skip_views: Vec<String>,
}

impl AllowlistRules {
    /// Check if a name matches any pattern in the list
    fn matches_pattern(name: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }

    /// Check if a view should be skipped
    pub fn is_view_skipped(&self, view: &str) -> bool {
        Self::matches_pattern(view, &self.skip_views)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Translation behaviour
    #[serde(default)]
    pub translate: TranslateConfig,

    /// Allowlist rules
    #[serde(default)]
    pub allowlist: AllowlistRules,
}

impl Config {
    /// Load config from TOML file
    ///
    /// A relative output directory is resolved against the config file's
    /// parent directory.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if config.output.dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.output.dir = parent.join(&config.output.dir);
            }
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Simple glob matching (supports a single * wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
