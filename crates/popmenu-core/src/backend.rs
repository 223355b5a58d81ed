//! Bridge to the window layer that owns the native overlay window.
//!
//! Every outbound call is best-effort: the bridge logs failures and moves on
//! so a flaky transport can never leave a menu stuck on screen. The only
//! failure that changes behaviour is [`BackendError::HandlerMissing`] from the
//! native preview request, which triggers one fallback attempt.

use std::path::{Path, PathBuf};

use crate::geometry::WindowBounds;
use crate::menu::MenuRenderOptions;
use crate::units::PhysicalRect;

/// Failure reported by the window layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The call has no handler on the other side.
    #[error("handler not found: {0}")]
    HandlerMissing(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend call failed: {0}")]
    Failed(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Operations the window layer exposes to a menu session.
pub trait MenuBackend {
    /// Options for the pending invocation; `None` when it was cancelled.
    fn menu_options(&mut self) -> BackendResult<Option<MenuRenderOptions>>;

    /// Logical units per CSS pixel.
    fn system_text_scale(&mut self) -> BackendResult<f64>;

    /// Physical pixels per logical unit.
    fn display_scale_factor(&mut self) -> BackendResult<f64>;

    fn resize_overlay(&mut self, bounds: WindowBounds) -> BackendResult<()>;

    fn update_hit_regions(
        &mut self,
        main: PhysicalRect,
        submenus: &[PhysicalRect],
    ) -> BackendResult<()>;

    /// Report the chosen item id, or `None` for a dismissal.
    fn submit_selection(&mut self, item_id: Option<&str>) -> BackendResult<()>;

    fn request_native_preview(&mut self, path: &Path) -> BackendResult<()>;

    fn cancel_native_preview(&mut self) -> BackendResult<()>;

    /// Fallback preview through a pinned image window.
    fn pin_image_preview(&mut self, path: &Path, preview_mode: bool) -> BackendResult<()>;

    /// Close a preview opened through [`MenuBackend::pin_image_preview`].
    fn close_pinned_preview(&mut self) -> BackendResult<()>;

    fn hide_overlay(&mut self) -> BackendResult<()>;
}

/// Best-effort wrapper around a [`MenuBackend`].
#[derive(Debug)]
pub struct BackendBridge<B> {
    backend: B,
}

fn ignore(call: &str, result: BackendResult<()>) {
    if let Err(e) = result {
        tracing::debug!("Ignoring failed backend call {call}: {e}");
    }
}

impl<B: MenuBackend> BackendBridge<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Fetch render options; any failure reads as "nothing to show".
    pub fn fetch_options(&mut self) -> Option<MenuRenderOptions> {
        match self.backend.menu_options() {
            Ok(options) => options,
            Err(e) => {
                tracing::debug!("No menu options: {e}");
                None
            }
        }
    }

    /// Text scale, 1 on failure. Range checks happen in [`crate::units::Scales`].
    pub fn text_scale(&mut self) -> f64 {
        self.backend.system_text_scale().unwrap_or_else(|e| {
            tracing::warn!("Failed to read text scale, using 1: {e}");
            1.0
        })
    }

    /// Display scale factor, 1 on failure.
    pub fn scale_factor(&mut self) -> f64 {
        self.backend.display_scale_factor().unwrap_or_else(|e| {
            tracing::warn!("Failed to read display scale factor, using 1: {e}");
            1.0
        })
    }

    pub fn resize(&mut self, bounds: WindowBounds) {
        ignore("resize_overlay", self.backend.resize_overlay(bounds));
    }

    pub fn update_regions(&mut self, main: PhysicalRect, submenus: &[PhysicalRect]) {
        ignore(
            "update_hit_regions",
            self.backend.update_hit_regions(main, submenus),
        );
    }

    pub fn submit(&mut self, item_id: Option<&str>) {
        ignore("submit_selection", self.backend.submit_selection(item_id));
    }

    /// Ask for a native preview, falling back to a pinned window only when
    /// the native handler is missing.
    pub fn show_preview(&mut self, path: &Path) {
        match self.backend.request_native_preview(path) {
            Ok(()) => {}
            Err(BackendError::HandlerMissing(reason)) => {
                tracing::debug!("Native preview unavailable ({reason}), pinning instead");
                ignore(
                    "pin_image_preview",
                    self.backend.pin_image_preview(path, true),
                );
            }
            Err(e) => tracing::debug!("Ignoring failed preview request: {e}"),
        }
    }

    /// Close both kinds of preview.
    pub fn close_preview(&mut self) {
        ignore("cancel_native_preview", self.backend.cancel_native_preview());
        ignore("close_pinned_preview", self.backend.close_pinned_preview());
    }

    pub fn hide(&mut self) {
        ignore("hide_overlay", self.backend.hide_overlay());
    }
}

/// A call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    MenuOptions,
    Resize(WindowBounds),
    HitRegions {
        main: PhysicalRect,
        submenus: Vec<PhysicalRect>,
    },
    Submit(Option<String>),
    RequestPreview(PathBuf),
    CancelPreview,
    PinPreview {
        path: PathBuf,
        preview_mode: bool,
    },
    ClosePinnedPreview,
    Hide,
}

/// In-process backend that serves fixed options and records every call.
///
/// Used by the command-line host and by tests.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    pub options: Option<MenuRenderOptions>,
    pub text_scale: BackendResult<f64>,
    pub scale_factor: BackendResult<f64>,

    /// Error returned by `request_native_preview`, if any.
    pub preview_error: Option<BackendError>,

    /// Make every fire-and-forget call fail.
    pub fail_calls: bool,

    pub calls: Vec<BackendCall>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            options: None,
            text_scale: Ok(1.0),
            scale_factor: Ok(1.0),
            preview_error: None,
            fail_calls: false,
            calls: Vec::new(),
        }
    }
}

impl RecordingBackend {
    pub fn with_options(options: MenuRenderOptions) -> Self {
        Self {
            options: Some(options),
            ..Self::default()
        }
    }

    fn outcome(&self) -> BackendResult<()> {
        if self.fail_calls {
            Err(BackendError::Unavailable("recording backend set to fail".into()))
        } else {
            Ok(())
        }
    }

    fn record(&mut self, call: BackendCall) -> BackendResult<()> {
        self.calls.push(call);
        self.outcome()
    }

    /// Calls to `submit_selection`, in order.
    pub fn submissions(&self) -> Vec<Option<String>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Submit(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_resize(&self) -> Option<WindowBounds> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::Resize(bounds) => Some(*bounds),
            _ => None,
        })
    }

    pub fn last_regions(&self) -> Option<(PhysicalRect, Vec<PhysicalRect>)> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::HitRegions { main, submenus } => Some((*main, submenus.clone())),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl MenuBackend for RecordingBackend {
    fn menu_options(&mut self) -> BackendResult<Option<MenuRenderOptions>> {
        self.calls.push(BackendCall::MenuOptions);
        Ok(self.options.clone())
    }

    fn system_text_scale(&mut self) -> BackendResult<f64> {
        self.text_scale.clone()
    }

    fn display_scale_factor(&mut self) -> BackendResult<f64> {
        self.scale_factor.clone()
    }

    fn resize_overlay(&mut self, bounds: WindowBounds) -> BackendResult<()> {
        self.record(BackendCall::Resize(bounds))
    }

    fn update_hit_regions(
        &mut self,
        main: PhysicalRect,
        submenus: &[PhysicalRect],
    ) -> BackendResult<()> {
        self.record(BackendCall::HitRegions {
            main,
            submenus: submenus.to_vec(),
        })
    }

    fn submit_selection(&mut self, item_id: Option<&str>) -> BackendResult<()> {
        self.record(BackendCall::Submit(item_id.map(str::to_string)))
    }

    fn request_native_preview(&mut self, path: &Path) -> BackendResult<()> {
        self.calls.push(BackendCall::RequestPreview(path.to_path_buf()));
        match &self.preview_error {
            Some(e) => Err(e.clone()),
            None => self.outcome(),
        }
    }

    fn cancel_native_preview(&mut self) -> BackendResult<()> {
        self.record(BackendCall::CancelPreview)
    }

    fn pin_image_preview(&mut self, path: &Path, preview_mode: bool) -> BackendResult<()> {
        self.record(BackendCall::PinPreview {
            path: path.to_path_buf(),
            preview_mode,
        })
    }

    fn close_pinned_preview(&mut self) -> BackendResult<()> {
        self.record(BackendCall::ClosePinnedPreview)
    }

    fn hide_overlay(&mut self) -> BackendResult<()> {
        self.record(BackendCall::Hide)
    }
}
