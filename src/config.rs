//! YAML configuration for the historical-data panel.
//!
//! Every field is optional in the file; missing fields take their defaults.

use crate::color::Rgba;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up under the user configuration directory.
pub const CONFIG_FILE: &str = "trueno-strip/history.yaml";

/// Historical-data panel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// How much history each chart shows, in seconds.
    #[serde(default = "default_monitoring_interval_s")]
    pub monitoring_interval_s: u32,

    /// Seconds between samples.
    #[serde(default = "default_refresh_interval_s")]
    pub refresh_interval_s: u32,

    /// Curve color as `#rrggbb` or `#rrggbbaa`.
    #[serde(default = "default_graph_color")]
    pub graph_color: String,

    /// Opacity of the area under the curve.
    #[serde(default = "default_fill_alpha")]
    pub fill_alpha: f32,

    /// Curve stroke width.
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Height of each chart in pixels.
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    /// Color painted behind each chart.
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_monitoring_interval_s() -> u32 {
    300
}
fn default_refresh_interval_s() -> u32 {
    3
}
fn default_graph_color() -> String {
    "#76b900".to_string()
}
fn default_fill_alpha() -> f32 {
    0.5
}
fn default_line_width() -> f32 {
    1.5
}
fn default_chart_height() -> u32 {
    80
}
fn default_background() -> String {
    "#00000000".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            monitoring_interval_s: default_monitoring_interval_s(),
            refresh_interval_s: default_refresh_interval_s(),
            graph_color: default_graph_color(),
            fill_alpha: default_fill_alpha(),
            line_width: default_line_width(),
            chart_height: default_chart_height(),
            background: default_background(),
        }
    }
}

impl HistoryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the configuration file, if the platform has a
    /// user configuration directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file cannot be read, or a
    /// parse/validation error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Loads configuration, falling back to defaults on any error.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("using default history configuration: {e}");
                Self::default()
            }
        }
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the failing line, or a validation
    /// error from [`validate`](Self::validate).
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for an unparseable color, or
    /// [`Error::ConfigParse`] (line 0) for an out-of-range value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Error::ConfigParse {
            line: 0,
            message: message.to_string(),
        };
        if self.refresh_interval_s == 0 {
            return Err(invalid("refresh_interval_s must be positive"));
        }
        if self.monitoring_interval_s < self.refresh_interval_s {
            return Err(invalid(
                "monitoring_interval_s must be at least refresh_interval_s",
            ));
        }
        if !(0.0..=1.0).contains(&self.fill_alpha) {
            return Err(invalid("fill_alpha must be within 0.0..=1.0"));
        }
        if !self.line_width.is_finite() || self.line_width < 0.0 {
            return Err(invalid("line_width must be a non-negative number"));
        }
        self.graph_color()?;
        self.background()?;
        Ok(())
    }

    /// Parsed curve color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if `graph_color` is not a hex color.
    pub fn graph_color(&self) -> Result<Rgba> {
        Rgba::from_hex(&self.graph_color)
    }

    /// Parsed background color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if `background` is not a hex color.
    pub fn background(&self) -> Result<Rgba> {
        Rgba::from_hex(&self.background)
    }

    /// Samples each chart holds: one per refresh plus the seed sample.
    #[must_use]
    pub fn capacity(&self) -> usize {
        (self.monitoring_interval_s / self.refresh_interval_s.max(1)) as usize + 1
    }

    /// Visible history.
    #[must_use]
    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.monitoring_interval_s))
    }

    /// Interval between samples.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval_s))
    }
}
