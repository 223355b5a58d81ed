//! Unit conversions between CSS pixels, logical units and physical pixels.
//!
//! Three spaces are in play:
//!
//! - **CSS pixels**: what the rendering surface lays out in.
//! - **Logical units**: CSS pixels scaled by the user's text-scale setting.
//!   Monitor sizes, the cursor and the window origin live here.
//! - **Physical pixels**: logical units times the display scale factor.
//!
//! Conversions are always composed step by step. The planner clamps against
//! screen edges in logical space and only converts to physical pixels at the
//! very end, when talking to the window manager.

use serde::{Deserialize, Serialize};

/// Multiplier used in place of a zero, negative or non-finite scale.
pub const NEUTRAL_SCALE: f64 = 1.0;

/// Return `value` if it is a usable scale, otherwise [`NEUTRAL_SCALE`].
pub fn sanitize_scale(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        NEUTRAL_SCALE
    }
}

/// CSS pixels to logical units.
pub fn to_logical(css: f64, text_scale: f64) -> f64 {
    css * sanitize_scale(text_scale)
}

/// Logical units to CSS pixels.
pub fn to_css(logical: f64, text_scale: f64) -> f64 {
    logical / sanitize_scale(text_scale)
}

/// Logical units to physical pixels.
pub fn to_physical(logical: f64, scale_factor: f64) -> f64 {
    logical * sanitize_scale(scale_factor)
}

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in floating point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// A rectangle in integer physical pixels, as handed to the window manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// The scale factors in effect for one render pass.
///
/// Construction sanitizes both factors, so downstream math never sees a zero
/// or NaN multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    /// Physical pixels per logical unit.
    scale_factor: f64,
    /// Logical units per CSS pixel.
    text_scale: f64,
}

impl Default for Scales {
    fn default() -> Self {
        Self {
            scale_factor: NEUTRAL_SCALE,
            text_scale: NEUTRAL_SCALE,
        }
    }
}

impl Scales {
    pub fn new(scale_factor: f64, text_scale: f64) -> Self {
        if sanitize_scale(scale_factor) != scale_factor {
            tracing::warn!("Invalid display scale factor {scale_factor}, using 1");
        }
        if sanitize_scale(text_scale) != text_scale {
            tracing::warn!("Invalid text scale {text_scale}, using 1");
        }
        Self {
            scale_factor: sanitize_scale(scale_factor),
            text_scale: sanitize_scale(text_scale),
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn text_scale(&self) -> f64 {
        self.text_scale
    }

    pub fn to_logical(&self, css: f64) -> f64 {
        to_logical(css, self.text_scale)
    }

    pub fn to_css(&self, logical: f64) -> f64 {
        to_css(logical, self.text_scale)
    }

    pub fn to_physical(&self, logical: f64) -> f64 {
        to_physical(logical, self.scale_factor)
    }

    /// CSS pixels straight to physical pixels, via logical units.
    pub fn css_to_physical(&self, css: f64) -> f64 {
        self.to_physical(self.to_logical(css))
    }
}
