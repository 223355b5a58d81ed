//! popmenu-core - placement engine and session model for overlay context menus.
//!
//! The crate is host-agnostic: a window layer implements
//! [`backend::MenuBackend`], a renderer implements [`layout::RenderSurface`],
//! and a [`Session`] drives both from pointer, keyboard and clock events.

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hover;
pub mod layout;
pub mod logging;
pub mod menu;
pub mod session;
pub mod theme;
pub mod timers;
pub mod tree;
pub mod units;

pub use backend::{BackendBridge, BackendCall, BackendError, MenuBackend, RecordingBackend};
pub use config::{Config, ConfigLoadResult};
pub use error::{Error, Result};
pub use geometry::{ScreenContext, Side, WindowBounds};
pub use layout::{EstimatedLayout, RenderSurface};
pub use menu::{MenuItem, MenuRenderOptions};
pub use session::{ClickPart, Key, Session, SessionPhase};
pub use theme::{Appearance, ThemeSetting};
pub use tree::{HitTarget, PanelId, PanelTree};
pub use units::{PhysicalRect, Point, Rect, Size};
