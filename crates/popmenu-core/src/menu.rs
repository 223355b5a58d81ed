//! Menu item data model and the render options received from the host.
//!
//! Field names follow the JSON the window layer sends, so both types
//! deserialize straight from it.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::theme::ThemeSetting;
use crate::units::Point;

const DEFAULT_MONITOR_WIDTH: f64 = 1920.0;
const DEFAULT_MONITOR_HEIGHT: f64 = 1080.0;

/// One entry of a menu: an action, a submenu parent or a separator.
///
/// A separator carries no other data. Items are immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub id: String,
    pub label: String,

    /// Named glyph from the icon font.
    pub icon: Option<String>,

    /// CSS color applied to the named glyph.
    pub icon_color: Option<String>,

    /// Image file used as icon; wins over `icon`.
    pub favicon: Option<PathBuf>,

    /// Image shown in a preview window while the item is hovered.
    pub preview_image: Option<PathBuf>,

    pub disabled: bool,

    /// Nested items. Empty for leaves; `null` reads as empty.
    #[serde(deserialize_with = "null_as_empty")]
    pub children: Vec<MenuItem>,

    pub separator: bool,
}

/// The icon slot of a row, after resolving precedence.
///
/// Every row has one, so the label column lines up across rows.
#[derive(Debug, Clone, PartialEq)]
pub enum IconSlot {
    Image(PathBuf),
    Glyph { name: String, color: Option<String> },
    Blank,
}

impl MenuItem {
    /// Create a leaf action item.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn separator() -> Self {
        Self {
            separator: true,
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }

    pub fn with_icon(mut self, name: impl Into<String>, color: Option<&str>) -> Self {
        self.icon = Some(name.into());
        self.icon_color = color.map(str::to_string);
        self
    }

    pub fn with_image_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.favicon = Some(path.into());
        self
    }

    pub fn with_preview(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_image = Some(path.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn is_separator(&self) -> bool {
        self.separator
    }

    /// True for non-separator items with at least one child.
    pub fn has_submenu(&self) -> bool {
        !self.separator && !self.children.is_empty()
    }

    /// Image icon beats named glyph beats blank placeholder.
    pub fn icon_slot(&self) -> IconSlot {
        if let Some(path) = &self.favicon {
            IconSlot::Image(path.clone())
        } else if let Some(name) = &self.icon {
            IconSlot::Glyph {
                name: name.clone(),
                color: self.icon_color.clone(),
            }
        } else {
            IconSlot::Blank
        }
    }
}

/// Everything the host hands over to start a menu session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuRenderOptions {
    pub items: Vec<MenuItem>,

    /// Theme override; `None` means use the configured default. Names other
    /// than light and dark resolve to auto.
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: Option<ThemeSetting>,

    /// Opened from a status-area icon: bottom-anchored, extra bottom margin.
    pub is_tray_menu: bool,

    /// Monitor origin in physical pixels.
    pub monitor_x: Option<f64>,
    pub monitor_y: Option<f64>,

    /// Monitor size in logical units.
    pub monitor_width: Option<f64>,
    pub monitor_height: Option<f64>,

    /// Pointer position in logical units, relative to the monitor.
    pub cursor_x: f64,
    pub cursor_y: f64,
}

impl MenuRenderOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn cursor(&self) -> Point {
        Point::new(self.cursor_x, self.cursor_y)
    }

    /// Monitor origin, defaulting to the top-left of the desktop.
    pub fn monitor_origin(&self) -> Point {
        Point::new(self.monitor_x.unwrap_or(0.0), self.monitor_y.unwrap_or(0.0))
    }

    /// Monitor width, with zero or missing values replaced by 1920.
    pub fn monitor_width(&self) -> f64 {
        positive_or(self.monitor_width, DEFAULT_MONITOR_WIDTH)
    }

    /// Monitor height, with zero or missing values replaced by 1080.
    pub fn monitor_height(&self) -> f64 {
        positive_or(self.monitor_height, DEFAULT_MONITOR_HEIGHT)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<MenuItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<MenuItem>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_theme<'de, D>(deserializer: D) -> std::result::Result<Option<ThemeSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.map(|name| {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!("Unknown theme {:?}, following the system", name);
            ThemeSetting::Auto
        })
    }))
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}
