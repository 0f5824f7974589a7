//! Configuration for clusterplot hosts
//!
//! Sources, highest precedence first:
//! 1. Environment variables (`CLUSTERPLOT_*`)
//! 2. Configuration files (.clusterplot.yaml, .clusterplot.json, ...)
//! 3. Built-in defaults

use crate::core::camera::{DisplaySettings, ProjectionKind};
use crate::core::view::{InteractionSettings, ViewStateManager};
use crate::scene::builder::{SceneBuilder, SceneLayout};
use crate::scene::primitives::ChartConfiguration;
use crate::styling::ClusterPalette;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level clusterplot configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterPlotConfig {
    /// Which primitive families to draw
    pub chart: ChartConfiguration,
    /// Render volume, marker radius and initial angles
    pub display: DisplaySettings,
    /// Grid divisions, label offsets, marker scaling
    pub layout: SceneLayout,
    pub view: ViewConfig,
    pub interaction: InteractionSettings,
    pub logging: LoggingConfig,
}

/// Initial projection and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub projection: ProjectionKind,
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            zoom: 1.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Emit span timings to the trace hook
    pub traces: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            traces: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

impl ClusterPlotConfig {
    /// View manager seeded with the configured display, projection and zoom.
    pub fn view_manager(&self) -> ViewStateManager {
        ViewStateManager::new(self.display, self.view.projection)
            .with_interaction(self.interaction)
            .with_zoom(self.view.zoom)
    }

    pub fn scene_builder(&self, palette: ClusterPalette) -> SceneBuilder {
        SceneBuilder::new(self.layout.clone(), palette)
    }
}

/// Configuration loader with multiple source support
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and the environment.
    pub fn load() -> Result<ClusterPlotConfig> {
        let mut config = Self::load_from_files()?;
        Self::apply_environment_variables(&mut config);
        Ok(config)
    }

    fn load_from_files() -> Result<ClusterPlotConfig> {
        for path in Self::find_config_files() {
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(ClusterPlotConfig::default())
    }

    /// Candidate configuration paths, most specific first.
    pub fn find_config_files() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(config_path) = env::var("CLUSTERPLOT_CONFIG") {
            paths.push(PathBuf::from(config_path));
        }

        if let Ok(current_dir) = env::current_dir() {
            for name in [".clusterplot.yaml", ".clusterplot.yml", ".clusterplot.json"] {
                paths.push(current_dir.join(name));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".clusterplot.yaml"));
            paths.push(home_dir.join(".clusterplot.json"));
            paths.push(home_dir.join(".config/clusterplot/config.yaml"));
            paths.push(home_dir.join(".config/clusterplot/config.json"));
        }

        paths
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<ClusterPlotConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            _ => {
                if let Ok(config) = serde_json::from_str(&content) {
                    config
                } else if let Ok(config) = serde_yaml::from_str(&content) {
                    config
                } else {
                    return Err(anyhow::anyhow!(
                        "Could not parse config file {} (tried JSON, YAML)",
                        path.display()
                    ));
                }
            }
        };

        Ok(config)
    }

    fn apply_environment_variables(config: &mut ClusterPlotConfig) {
        Self::apply_overrides(config, |key| env::var(key).ok());
    }

    /// Apply `CLUSTERPLOT_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored and the existing setting is kept.
    pub fn apply_overrides<F>(config: &mut ClusterPlotConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags: [(&str, &mut bool); 4] = [
            ("CLUSTERPLOT_GRID", &mut config.chart.grid),
            ("CLUSTERPLOT_GRID_LABELS", &mut config.chart.grid_labels),
            ("CLUSTERPLOT_AXIS", &mut config.chart.axis),
            ("CLUSTERPLOT_AXIS_LABELS", &mut config.chart.axis_labels),
        ];
        for (key, slot) in flags {
            if let Some(value) = lookup(key).as_deref().and_then(parse_bool) {
                *slot = value;
            }
        }

        let extents: [(&str, &mut f64); 4] = [
            ("CLUSTERPLOT_WIDTH", &mut config.display.width),
            ("CLUSTERPLOT_HEIGHT", &mut config.display.height),
            ("CLUSTERPLOT_DEPTH", &mut config.display.depth),
            ("CLUSTERPLOT_RADIUS", &mut config.display.radius),
        ];
        for (key, slot) in extents {
            if let Some(value) = lookup(key).and_then(|v| v.trim().parse::<f64>().ok()) {
                if value.is_finite() && value >= 0.0 {
                    *slot = value;
                } else {
                    debug!("Ignoring {key}={value}");
                }
            }
        }

        if let Some(projection) = lookup("CLUSTERPLOT_PROJECTION") {
            config.view.projection = match projection.to_lowercase().as_str() {
                "orthographic" | "ortho" => ProjectionKind::Orthographic,
                "perspective" => match config.view.projection {
                    p @ ProjectionKind::Perspective { .. } => p,
                    ProjectionKind::Orthographic => ProjectionKind::perspective(),
                },
                _ => config.view.projection,
            };
        }

        if let Some(level) = lookup("CLUSTERPLOT_LOG_LEVEL").as_deref().and_then(LogLevel::parse) {
            config.logging.level = level;
        }
    }

    /// Save configuration to a file
    pub fn save_to_file(config: &ClusterPlotConfig, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(config)
                .context("Failed to serialize config to JSON")?,
            _ => serde_yaml::to_string(config).context("Failed to serialize config to YAML")?,
        };

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Default configuration rendered as YAML.
    pub fn generate_sample_config() -> String {
        let config = ClusterPlotConfig::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| "# Failed to generate config".to_string())
    }
}

/// Parse a boolean value from string with various formats
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enable" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = ClusterPlotConfig::default();
        assert!(config.chart.grid && config.chart.axis);
        assert_eq!(config.display.width, 600.0);
        assert_eq!(config.view.projection, ProjectionKind::Orthographic);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "chart:\n  grid: false\ndisplay:\n  width: 800\n";
        let config: ClusterPlotConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.chart.grid);
        assert!(config.chart.axis);
        assert_eq!(config.display.width, 800.0);
        assert_eq!(config.display.height, 600.0);
        assert_eq!(config.layout.grid_divisions, 5);
    }

    #[test]
    fn test_projection_from_json() {
        let json = r#"{"view":{"projection":{"kind":"perspective","focal_factor":3.0},"zoom":2.0}}"#;
        let config: ClusterPlotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.view.projection,
            ProjectionKind::Perspective { focal_factor: 3.0 }
        );
        assert_eq!(config.view_manager().snapshot().view.zoom, 2.0);
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        for name in [".clusterplot.yaml", ".clusterplot.json"] {
            let config_path = temp_dir.path().join(name);
            let mut config = ClusterPlotConfig::default();
            config.chart.grid_labels = false;
            config.display.radius = 6.0;
            config.layout.grid_divisions = 8;

            ConfigLoader::save_to_file(&config, &config_path).unwrap();
            let loaded = ConfigLoader::load_from_file(&config_path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unknown_extension_is_detected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("clusterplot.conf");
        fs::write(&config_path, "chart:\n  axis: false\n").unwrap();
        let loaded = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(!loaded.chart.axis);
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = ClusterPlotConfig::default();
        ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[
                ("CLUSTERPLOT_GRID", "off"),
                ("CLUSTERPLOT_AXIS_LABELS", "no"),
                ("CLUSTERPLOT_WIDTH", "1024"),
                ("CLUSTERPLOT_HEIGHT", "-5"),
                ("CLUSTERPLOT_PROJECTION", "Perspective"),
                ("CLUSTERPLOT_LOG_LEVEL", "debug"),
            ]),
        );
        assert!(!config.chart.grid);
        assert!(!config.chart.axis_labels);
        assert!(config.chart.axis);
        assert_eq!(config.display.width, 1024.0);
        assert_eq!(config.display.height, 600.0);
        assert_eq!(config.view.projection, ProjectionKind::perspective());
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = ClusterPlotConfig::default();
        ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[
                ("CLUSTERPLOT_GRID", "maybe"),
                ("CLUSTERPLOT_PROJECTION", "fisheye"),
                ("CLUSTERPLOT_LOG_LEVEL", "loud"),
            ]),
        );
        assert_eq!(config, ClusterPlotConfig::default());
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = ConfigLoader::generate_sample_config();
        let parsed: ClusterPlotConfig = serde_yaml::from_str(&sample).unwrap();
        assert_eq!(parsed, ClusterPlotConfig::default());
    }

    #[test]
    fn test_bool_parsing() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" Yes "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("invalid"), None);
    }
}
