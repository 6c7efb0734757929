//! Layered configuration.
//!
//! Settings come from, lowest priority first: built-in defaults, an
//! optional TOML file, and `ULTIUI_*` environment variables
//! (e.g. `ULTIUI_TOLERANCE_MM=0.15`).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use ultiui_engine::{TelemetryEngine, DEFAULT_FLOW_CAPACITY, DEFAULT_HISTORY_CAPACITY, DEFAULT_TOLERANCE_MM};

use crate::data::parse_duration;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "ultiui.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ULTIUI";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of deduplicated log entries kept.
    pub history_capacity: usize,
    /// Span within which repeated lines collapse, e.g. `"60s"`.
    pub dedup_window: String,
    /// Tolerance used for leveling verdicts, in millimeters.
    pub tolerance_mm: f64,
    /// Flow samples retained for live summaries.
    pub flow_capacity: usize,
    /// Default number of points in a downsampled flow series.
    pub flow_max_points: usize,
    /// Default number of log records printed.
    pub recent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            dedup_window: "60s".to_string(),
            tolerance_mm: DEFAULT_TOLERANCE_MM,
            flow_capacity: DEFAULT_FLOW_CAPACITY,
            flow_max_points: 200,
            recent: 100,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required) or from `ultiui.toml` if it
    /// exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        tracing::debug!(?settings, "configuration loaded");
        Ok(settings)
    }

    /// The dedup window as a duration.
    pub fn dedup_window(&self) -> Result<Duration> {
        parse_duration(&self.dedup_window)
            .with_context(|| format!("Invalid dedup_window: {}", self.dedup_window))
    }

    /// Build an engine from these settings.
    pub fn build_engine(&self) -> Result<TelemetryEngine> {
        TelemetryEngine::builder()
            .history_capacity(self.history_capacity)
            .dedup_window(self.dedup_window()?)
            .tolerance(self.tolerance_mm)
            .flow_capacity(self.flow_capacity)
            .build()
            .context("Invalid engine settings")
    }
}
