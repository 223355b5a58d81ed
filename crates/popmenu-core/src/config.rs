//! Configuration types and parsing.
//!
//! The schema covers the tunable constants of the placement engine, the hover
//! timers and the estimated layout metrics. Everything has a default so an
//! empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml::Table;

use crate::error::{Error, Result};

/// Known valid values for theme.default.
const VALID_THEME_SETTINGS: &[&str] = &["auto", "dark", "light"];

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path where config was found, if any.
    pub source: Option<PathBuf>,
    /// Whether defaults were used (no config file found).
    pub used_defaults: bool,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Placement constants for the geometry planner.
    pub placement: PlacementConfig,

    /// Hover-intent delays.
    pub timing: TimingConfig,

    /// Metrics for the estimated layout engine.
    pub layout: LayoutConfig,

    /// Theme fallback.
    pub theme: ThemeConfig,
}

impl Config {
    /// Load configuration from the embedded default TOML string.
    pub fn from_default_toml() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, merging with embedded defaults.
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_with_defaults(&content)
    }

    /// Parse a TOML string, deep-merging it over the embedded defaults
    /// (user values win) before deserializing.
    fn load_with_defaults(user_toml: &str) -> Result<Self> {
        let mut base: Table = toml::from_str(DEFAULT_CONFIG_TOML)?;
        let user: Table = toml::from_str(user_toml)?;

        deep_merge_toml(&mut base, user);

        let config: Config = base.try_into()?;
        Ok(config)
    }

    /// Find and load configuration using the XDG lookup chain.
    ///
    /// If `explicit_path` is `Some`, that path is used directly and an error
    /// is returned if it doesn't exist or can't be parsed (no fallback).
    ///
    /// Otherwise searches, in order:
    /// 1. `$XDG_CONFIG_HOME/popmenu/config.toml`
    /// 2. `~/.config/popmenu/config.toml`
    /// 3. `./config.toml`
    ///
    /// A file that exists but fails to load is an error. Defaults are only
    /// used when none of the candidates exist.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            let config = Self::load(path)?;
            return Ok(ConfigLoadResult {
                config,
                source: Some(path.to_path_buf()),
                used_defaults: false,
            });
        }

        let search_paths = Self::config_search_paths();
        for path in &search_paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(config) => {
                    return Ok(ConfigLoadResult {
                        config,
                        source: Some(path.clone()),
                        used_defaults: false,
                    });
                }
                Err(e) => {
                    tracing::error!("Config file {:?} exists but failed to load: {}", path, e);
                    return Err(e);
                }
            }
        }

        tracing::info!("No config file found, using built-in default config");
        tracing::debug!(
            "Searched: {}",
            search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ConfigLoadResult {
            config: Self::from_default_toml()?,
            source: None,
            used_defaults: true,
        })
    }

    /// Get the list of paths to search for config files.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("popmenu/config.toml"));
        }

        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/popmenu/config.toml"));
        }

        paths.push(PathBuf::from("config.toml"));

        paths
    }

    /// Validate the configuration, collecting every invalid value.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let non_negative = [
            ("placement.tray_bottom_margin", self.placement.tray_bottom_margin),
            ("placement.body_padding", self.placement.body_padding),
            ("placement.shadow_margin", self.placement.shadow_margin),
            ("placement.max_window_offset", self.placement.max_window_offset),
            ("placement.window_padding", self.placement.window_padding),
            ("layout.separator_height", self.layout.separator_height),
            ("layout.panel_padding", self.layout.panel_padding),
            ("layout.icon_column", self.layout.icon_column),
            ("layout.indicator_column", self.layout.indicator_column),
            ("layout.min_panel_width", self.layout.min_panel_width),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name}: must be a non-negative number, got {value}"));
            }
        }

        let positive = [
            ("placement.submenu_max_width", self.placement.submenu_max_width),
            ("placement.submenu_max_height", self.placement.submenu_max_height),
            ("layout.row_height", self.layout.row_height),
            ("layout.char_width", self.layout.char_width),
            ("layout.label_max_width", self.layout.label_max_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name}: must be greater than zero, got {value}"));
            }
        }

        if !VALID_THEME_SETTINGS.contains(&self.theme.default.as_str()) {
            errors.push(format!(
                "theme.default: invalid value '{}', expected one of: {}",
                self.theme.default,
                VALID_THEME_SETTINGS.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }

    /// Human-readable summary, printed by `--check-config -v`.
    pub fn summary(&self) -> String {
        let p = &self.placement;
        let t = &self.timing;
        [
            "Placement:".to_string(),
            format!("  tray_bottom_margin: {}", p.tray_bottom_margin),
            format!("  body_padding: {} shadow_margin: {}", p.body_padding, p.shadow_margin),
            format!("  max_window_offset: {}", p.max_window_offset),
            format!(
                "  submenu max: {}x{}",
                p.submenu_max_width, p.submenu_max_height
            ),
            "Timing:".to_string(),
            format!("  submenu_close_delay: {}ms", t.submenu_close_delay_ms),
            format!("  preview_open_delay: {}ms", t.preview_open_delay_ms),
            format!("Theme: {}", self.theme.default),
        ]
        .join("\n")
    }
}

/// Deep merge two TOML tables, with `overlay` values taking precedence.
///
/// Nested tables merge recursively; any other value is replaced outright.
fn deep_merge_toml(base: &mut Table, overlay: Table) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(&key), overlay_value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge_toml(base_table, overlay_table);
            }
            (_, overlay_value) => {
                base.insert(key, overlay_value);
            }
        }
    }
}

/// Placement constants, in CSS pixels unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    /// Logical units reserved above the taskbar for tray menus.
    pub tray_bottom_margin: f64,

    /// Padding around the root panel, counted on both sides.
    pub body_padding: f64,

    /// Room for the drop shadow, counted once.
    pub shadow_margin: f64,

    /// Largest distance kept between the window origin and the root panel.
    pub max_window_offset: f64,

    /// Slack added to the window size beyond the furthest panel edge.
    pub window_padding: f64,

    pub submenu_max_width: f64,

    /// Submenus taller than this scroll.
    pub submenu_max_height: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            tray_bottom_margin: 50.0,
            body_padding: 8.0,
            shadow_margin: 5.0,
            max_window_offset: 210.0,
            window_padding: 10.0,
            submenu_max_width: 200.0,
            submenu_max_height: 400.0,
        }
    }
}

/// Hover-intent delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub submenu_close_delay_ms: u64,
    pub preview_open_delay_ms: u64,
}

impl TimingConfig {
    pub fn submenu_close_delay(&self) -> Duration {
        Duration::from_millis(self.submenu_close_delay_ms)
    }

    pub fn preview_open_delay(&self) -> Duration {
        Duration::from_millis(self.preview_open_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            submenu_close_delay_ms: 200,
            preview_open_delay_ms: 300,
        }
    }
}

/// Metrics for [`crate::layout::EstimatedLayout`], in CSS pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub row_height: f64,
    pub separator_height: f64,

    /// Vertical padding at the top and bottom of every panel.
    pub panel_padding: f64,

    /// Width reserved for the icon, present on every row so labels align.
    pub icon_column: f64,

    /// Width reserved for the submenu chevron.
    pub indicator_column: f64,

    /// Average glyph advance used to estimate label width.
    pub char_width: f64,

    /// Labels wider than this are ellipsized.
    pub label_max_width: f64,

    pub min_panel_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 28.0,
            separator_height: 9.0,
            panel_padding: 4.0,
            icon_column: 24.0,
            indicator_column: 20.0,
            char_width: 7.0,
            label_max_width: 200.0,
            min_panel_width: 120.0,
        }
    }
}

/// Theme fallback used when render options carry no theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// "auto", "light" or "dark".
    pub default: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: "auto".to_string(),
        }
    }
}
