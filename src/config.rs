use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalize: NormalizeConfig,
    pub format: FormatConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Strip a leading YAML front matter block.
    pub front_matter: bool,
    /// Keep single line breaks inside fenced code blocks.
    pub preserve_code_fences: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub emphasis: EmphasisPolicy,
    pub quote: QuoteStyle,
}

/// How emphasis is flattened into mrkdwn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmphasisPolicy {
    /// One pending delimiter, consumed by the next text fragment.
    #[default]
    FirstText,
    /// Every fragment inside an emphasis span is wrapped, nested spans
    /// compose.
    Nested,
}

/// How blockquote content becomes rich text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteStyle {
    /// Raw source lines as one unstyled run.
    #[default]
    Raw,
    /// Styled runs, formatted like list items.
    Styled,
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        // build.rs rejects a malformed bundled file.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn from_toml(content: &str, config_path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
            config_path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load config from a TOML file, or return defaults if it is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(%err, "using default configuration");
                Self::compiled_default()
            }
        }
    }
}
