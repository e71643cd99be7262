//! Engine configuration
//!
//! The configuration names identifiers that generated code must never
//! produce, typically names that clash with the target platform's own
//! symbols (`clear`, `white`, `body`, ...).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::assets::AssetBundle;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration for the template engine
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifiers no color may produce in any casing
    pub reserved_colors: Vec<String>,
    /// Identifiers no text style may produce in any casing
    pub reserved_text_styles: Vec<String>,
}

impl EngineConfig {
    /// Create a configuration with no reserved identifiers
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved_colors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_colors = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reserved_text_styles<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_text_styles = names.into_iter().map(Into::into).collect();
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Every reserved identifier produced by an asset in `bundle`.
    ///
    /// All four casings of each asset identity are checked. The result is
    /// sorted and free of duplicates.
    pub fn prohibited_identities(&self, bundle: &AssetBundle) -> Vec<String> {
        let color_hits = bundle
            .colors
            .iter()
            .flat_map(|c| c.identity().projections())
            .filter(|p| self.reserved_colors.contains(p));
        let style_hits = bundle
            .text_styles
            .iter()
            .flat_map(|s| s.identity().projections())
            .filter(|p| self.reserved_text_styles.contains(p));

        let mut hits: Vec<String> = color_hits.chain(style_hits).collect();
        hits.sort();
        hits.dedup();
        hits
    }
}
