//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. The
//! `[render]` table may be omitted entirely; every rendering constant has a
//! default matching the reference chart.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::engine::RenderConfig;
use crate::types::GapMask;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Built-in sample session.
    Inline,
    Csv,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default)]
    pub series_path: Option<String>,
    #[serde(default)]
    pub bets_path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Plotted-value gap mask. When omitted, the inline source uses the
    /// sample session's mask and other sources use none.
    #[serde(default)]
    pub gaps: Option<GapMask>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Where the rendered primitive list is written as JSON.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
    /// Reload period while serving; 0 disables reloading.
    #[serde(default)]
    pub refresh_secs: u64,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration text and check the render settings.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.render.validate()?;
        Ok(config)
    }
}
