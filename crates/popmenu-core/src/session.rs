//! Menu session lifecycle.
//!
//! A [`Session`] owns everything transient about one menu invocation: the
//! panel tree, scale factors, monitor bounds, the hover chain, pending timers
//! and the closing flag. The host drives it with input events, clock ticks and
//! the layout-settled barrier; the session answers through the backend bridge
//! and the render surface.
//!
//! ```text
//! load() ──► AwaitingLayout ──layout_settled()──► Rendered
//!   │                                               │ click / Escape / external close
//!   └─(no options)─► Hidden ◄──── Selecting | Dismissing
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{BackendBridge, MenuBackend};
use crate::config::Config;
use crate::geometry::{ScreenContext, hit_region, place_root, place_submenu, window_bounds};
use crate::hover::{HoverChain, HoverStates};
use crate::layout::RenderSurface;
use crate::menu::MenuRenderOptions;
use crate::theme::{Appearance, ThemeSetting, ThemeState};
use crate::timers::{TimerId, TimerQueue};
use crate::tree::{HitTarget, Panel, PanelId, PanelTree};
use crate::units::{PhysicalRect, Point, Rect, Scales, Size};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing on screen.
    Hidden,
    /// Tree committed to the surface, waiting for layout to settle.
    AwaitingLayout,
    /// Positioned and interactive.
    Rendered,
    /// An item was chosen; reporting it.
    Selecting,
    /// Cancelled; reporting the dismissal.
    Dismissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Which part of a row was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickPart {
    Body,
    /// The submenu chevron.
    Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    CloseSubmenu(PanelId),
    OpenPreview { panel: PanelId, row: usize },
}

/// One menu invocation, reusable across `reload`s.
pub struct Session<B, S> {
    config: Config,
    bridge: BackendBridge<B>,
    surface: S,
    phase: SessionPhase,
    closing: bool,
    theme: ThemeState,
    screen: ScreenContext,
    tree: Option<PanelTree>,
    cursor: Point,
    chain: HoverChain,
    hover: HoverStates,
    previews: HashMap<(PanelId, usize), TimerId>,
    timers: TimerQueue<TimerAction>,
    pointer: Option<HitTarget>,
    outcome: Option<Option<String>>,
}

impl<B: MenuBackend, S: RenderSurface> Session<B, S> {
    pub fn new(config: Config, backend: B, surface: S) -> Self {
        Self {
            config,
            bridge: BackendBridge::new(backend),
            surface,
            phase: SessionPhase::Hidden,
            closing: false,
            theme: ThemeState::new(false),
            screen: ScreenContext::default(),
            tree: None,
            cursor: Point::default(),
            chain: HoverChain::default(),
            hover: HoverStates::default(),
            previews: HashMap::new(),
            timers: TimerQueue::new(),
            pointer: None,
            outcome: None,
        }
    }

    /// Seed the system dark-mode preference before the first render.
    pub fn with_system_dark(mut self, dark: bool) -> Self {
        self.theme = ThemeState::new(dark);
        self
    }

    // === Accessors ===

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn tree(&self) -> Option<&PanelTree> {
        self.tree.as_ref()
    }

    pub fn screen(&self) -> &ScreenContext {
        &self.screen
    }

    pub fn appearance(&self) -> Appearance {
        self.theme.appearance()
    }

    pub fn theme_setting(&self) -> Option<ThemeSetting> {
        self.theme.setting()
    }

    /// Open submenu panels from shallowest to deepest, root excluded.
    pub fn hover_chain(&self) -> &[PanelId] {
        self.chain.panels()
    }

    /// Result of the last completed session: `Some(None)` for a dismissal.
    pub fn outcome(&self) -> Option<&Option<String>> {
        self.outcome.as_ref()
    }

    pub fn backend(&self) -> &B {
        self.bridge.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.bridge.backend_mut()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Earliest pending timer deadline, for hosts arming an OS timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Current window bounds and hit regions, as last reported.
    pub fn regions(&self) -> Option<(PhysicalRect, Vec<PhysicalRect>)> {
        let (root, submenus) = self.visible_rects()?;
        Some((
            hit_region(&self.screen, root),
            submenus
                .iter()
                .map(|&r| hit_region(&self.screen, r))
                .collect(),
        ))
    }

    // === Lifecycle ===

    /// Start a render cycle: fetch options, build the tree and commit it.
    ///
    /// Returns false (and stays hidden) when the host has nothing to show.
    /// Call [`Session::layout_settled`] once the surface has laid out.
    pub fn load(&mut self) -> bool {
        self.closing = false;
        self.outcome = None;
        self.reset_transient();

        let Some(options) = self.bridge.fetch_options() else {
            debug!("No menu options, staying hidden");
            self.phase = SessionPhase::Hidden;
            return false;
        };

        self.begin_render(options);
        true
    }

    /// Restart from scratch in the same overlay window.
    pub fn reload(&mut self) -> bool {
        info!("Reloading menu");
        self.load()
    }

    fn begin_render(&mut self, options: MenuRenderOptions) {
        let scales = Scales::new(self.bridge.scale_factor(), self.bridge.text_scale());
        self.screen = ScreenContext {
            monitor_origin: options.monitor_origin(),
            monitor_size: Size::new(options.monitor_width(), options.monitor_height()),
            scales,
            is_tray_menu: options.is_tray_menu,
            window_origin: Point::default(),
        };

        let setting = options
            .theme
            .or_else(|| self.config.theme.default.parse().ok());
        let appearance = self.theme.apply(setting);
        self.surface.set_appearance(appearance);

        let placement = &self.config.placement;
        let tree = PanelTree::build(
            &options.items,
            Size::new(placement.submenu_max_width, placement.submenu_max_height),
        );
        self.surface.commit(&tree);
        self.tree = Some(tree);
        self.cursor = options.cursor();
        self.phase = SessionPhase::AwaitingLayout;

        debug!(
            "Committed menu: {} items, tray={}, scale={}, text_scale={}",
            options.items.len(),
            options.is_tray_menu,
            scales.scale_factor(),
            scales.text_scale()
        );
    }

    /// Layout barrier: measure every panel, place the root and show it.
    ///
    /// Ignored unless a committed tree is waiting for layout.
    pub fn layout_settled(&mut self) -> bool {
        if self.phase != SessionPhase::AwaitingLayout {
            return false;
        }
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        if tree.is_empty() {
            warn!("Rendering a menu with no items");
        }

        for index in 0..tree.len() {
            let id = tree.panels()[index].id;
            match self.surface.measure(&tree.panels()[index]) {
                Some(metrics) => tree.apply_metrics(id, metrics),
                None => warn!("Panel {} has no layout yet, treating as empty", index),
            }
        }

        let placed = place_root(
            &self.screen,
            self.cursor,
            tree.root().visible_size(),
            &self.config.placement,
        );
        self.screen.window_origin = placed.window_origin;

        let root = tree.root_mut();
        root.position = placed.panel_position;
        root.visible = true;
        self.surface.present(tree);

        self.phase = SessionPhase::Rendered;
        info!(
            "Menu rendered at ({}, {}) logical",
            placed.menu_rect.x, placed.menu_rect.y
        );
        self.sync_backend();
        true
    }

    /// Report a choice (or dismissal) once, then hide.
    ///
    /// Returns false when a previous dismissal already claimed this cycle.
    pub fn dismiss(&mut self, item_id: Option<String>) -> bool {
        if self.closing {
            debug!("Already closing, ignoring dismiss of {:?}", item_id);
            return false;
        }
        self.closing = true;
        self.phase = if item_id.is_some() {
            SessionPhase::Selecting
        } else {
            SessionPhase::Dismissing
        };

        self.timers.clear();
        self.previews.clear();
        self.bridge.submit(item_id.as_deref());

        self.chain.clear();
        self.hover.clear();
        self.pointer = None;
        if let Some(tree) = self.tree.as_mut() {
            tree.hide_all();
            self.surface.present(tree);
        }
        self.bridge.hide();

        info!("Menu closed with {:?}", item_id);
        self.outcome = Some(item_id);
        self.phase = SessionPhase::Hidden;
        true
    }

    /// The window layer asked the menu to go away.
    pub fn external_close(&mut self) -> bool {
        self.dismiss(None)
    }

    pub fn key_pressed(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => self.dismiss(None),
            Key::Other => false,
        }
    }

    /// System dark-mode preference changed.
    pub fn system_theme_changed(&mut self, dark: bool) {
        if let Some(appearance) = self.theme.system_changed(dark) {
            debug!("Following system theme: {:?}", appearance);
            self.surface.set_appearance(appearance);
        }
    }

    // === Input ===

    /// Resolve a window CSS coordinate against the visible panels.
    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        self.tree.as_ref()?.hit_test(point)
    }

    pub fn pointer_moved_to(&mut self, point: Point) {
        let target = self.hit_test(point);
        self.pointer_moved(target);
    }

    /// Report what lies under the pointer; `None` is outside every panel.
    ///
    /// Enter and leave transitions are derived from the previous target.
    pub fn pointer_moved(&mut self, target: Option<HitTarget>) {
        if self.phase != SessionPhase::Rendered {
            return;
        }
        let target = target.filter(|t| self.is_visible(t.panel));
        let previous = self.pointer;
        if previous == target {
            return;
        }
        self.pointer = target;

        if let Some(prev) = previous
            && prev.row.is_some()
        {
            self.row_left(prev);
        }

        self.update_close_intent(target);

        if let Some(next) = target
            && next.row.is_some()
        {
            self.row_entered(next);
        }
    }

    /// Click on a row. Disabled rows and separators do nothing; a click on a
    /// submenu parent selects it unless it lands on the chevron.
    pub fn click(&mut self, target: HitTarget, part: ClickPart) -> bool {
        if self.phase != SessionPhase::Rendered {
            return false;
        }
        let Some(row) = self.tree.as_ref().and_then(|t| t.row(target)) else {
            return false;
        };
        if !row.is_interactive() {
            return false;
        }
        if row.submenu.is_some() && part == ClickPart::Indicator {
            return false;
        }
        let item_id = row.item_id.clone();
        self.dismiss(item_id)
    }

    /// Scroll a visible panel by `delta` CSS pixels.
    pub fn scroll_panel(&mut self, panel: PanelId, delta: f64) {
        if self.phase != SessionPhase::Rendered {
            return;
        }
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        if let Some(p) = tree.get_mut(panel).filter(|p| p.visible) {
            p.scroll_by(delta);
            self.surface.present(tree);
        }
    }

    /// Advance the clock and fire every timer that came due.
    pub fn advance(&mut self, now: Duration) {
        while let Some((_, action)) = self.timers.pop_due(now) {
            match action {
                TimerAction::CloseSubmenu(panel) => self.close_submenu(panel),
                TimerAction::OpenPreview { panel, row } => {
                    self.previews.remove(&(panel, row));
                    self.open_preview(panel, row);
                }
            }
        }
        self.timers.set_now(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance(self.timers.now() + delta);
    }

    // === Internals ===

    fn is_visible(&self, panel: PanelId) -> bool {
        self.tree
            .as_ref()
            .and_then(|t| t.get(panel))
            .is_some_and(|p| p.visible)
    }

    /// The submenu's parent row or anything inside its subtree.
    fn is_inside_submenu(&self, submenu: PanelId, target: HitTarget) -> bool {
        let Some(tree) = self.tree.as_ref() else {
            return false;
        };
        if tree.is_within(target.panel, submenu) {
            return true;
        }
        tree.get(submenu)
            .and_then(|p| p.parent)
            .is_some_and(|link| target.panel == link.panel && target.row == Some(link.row))
    }

    /// Arm close timers for open submenus the pointer left, disarm them for
    /// submenus it came back to.
    fn update_close_intent(&mut self, target: Option<HitTarget>) {
        let delay = self.config.timing.submenu_close_delay();
        for panel in self.chain.panels().to_vec() {
            let inside = target.is_some_and(|t| self.is_inside_submenu(panel, t));
            let hover = self.hover.entry(panel);
            if inside {
                if let Some(id) = hover.pending_close.take() {
                    self.timers.cancel(id);
                }
            } else if hover.pending_close.is_none() {
                hover.pending_close = Some(
                    self.timers
                        .schedule(delay, TimerAction::CloseSubmenu(panel)),
                );
            }
        }
    }

    fn row_entered(&mut self, target: HitTarget) {
        let Some(row) = self.tree.as_ref().and_then(|t| t.row(target)) else {
            return;
        };
        let (row_index, has_preview, disabled, submenu) = (
            target.row.unwrap_or_default(),
            row.preview_image.is_some(),
            row.disabled,
            row.submenu,
        );

        if has_preview {
            let key = (target.panel, row_index);
            if let Some(old) = self.previews.remove(&key) {
                self.timers.cancel(old);
            }
            let id = self.timers.schedule(
                self.config.timing.preview_open_delay(),
                TimerAction::OpenPreview {
                    panel: target.panel,
                    row: row_index,
                },
            );
            self.previews.insert(key, id);
        }

        if disabled {
            return;
        }
        if let Some(submenu) = submenu {
            self.open_submenu(submenu);
        }
    }

    fn row_left(&mut self, target: HitTarget) {
        let has_preview = self
            .tree
            .as_ref()
            .and_then(|t| t.row(target))
            .is_some_and(|r| r.preview_image.is_some());
        if !has_preview {
            return;
        }
        if let Some(row) = target.row
            && let Some(id) = self.previews.remove(&(target.panel, row))
        {
            self.timers.cancel(id);
        }
        self.bridge.close_preview();
    }

    fn open_preview(&mut self, panel: PanelId, row: usize) {
        let path = self
            .tree
            .as_ref()
            .and_then(|t| t.get(panel))
            .and_then(|p| p.rows.get(row))
            .and_then(|r| r.preview_image.clone());
        if let Some(path) = path {
            debug!("Requesting preview for {}", path.display());
            self.bridge.show_preview(&path);
        }
    }

    /// Open `submenu`, closing whatever else was open at its depth or deeper,
    /// then report the new geometry.
    fn open_submenu(&mut self, submenu: PanelId) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        let Some((depth, link)) = tree
            .get(submenu)
            .and_then(|p| p.parent.map(|link| (p.depth, link)))
        else {
            return;
        };

        for closed in self.chain.open(submenu, depth) {
            if let Some(p) = tree.get_mut(closed) {
                p.visible = false;
            }
            if let Some(id) = self.hover.entry(closed).close() {
                self.timers.cancel(id);
            }
        }
        if let Some(id) = self.hover.entry(submenu).open() {
            self.timers.cancel(id);
        }

        let Some(parent) = tree.get(link.panel) else {
            return;
        };
        let parent_rect = parent.rect();
        let row_top = parent.row_top(link.row).unwrap_or_default();
        let size = tree.get(submenu).map(Panel::visible_size).unwrap_or_default();
        let placed = place_submenu(
            &self.screen,
            parent_rect,
            row_top,
            size,
            &self.config.placement,
        );

        if let Some(panel) = tree.get_mut(submenu) {
            panel.position = placed.position;
            panel.visible = true;
            panel.update_scroll_indicator();
        }
        self.surface.present(tree);
        debug!(
            "Opened submenu {:?} on the {:?} at {:?}",
            submenu, placed.side, placed.position
        );

        self.sync_backend();
    }

    /// Close `submenu` and its descendants, then report the new geometry.
    fn close_submenu(&mut self, submenu: PanelId) {
        let closed = self.chain.close(submenu);
        if closed.is_empty() {
            return;
        }
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        for panel in closed {
            if let Some(p) = tree.get_mut(panel) {
                p.visible = false;
            }
            if let Some(id) = self.hover.entry(panel).close() {
                self.timers.cancel(id);
            }
        }
        self.surface.present(tree);
        debug!("Closed submenu {:?}", submenu);

        self.sync_backend();
    }

    fn visible_rects(&self) -> Option<(Rect, Vec<Rect>)> {
        let tree = self.tree.as_ref()?;
        if !tree.root().visible {
            return None;
        }
        let submenus = self
            .chain
            .panels()
            .iter()
            .filter_map(|&id| tree.get(id))
            .filter(|p| p.visible)
            .map(Panel::rect)
            .collect();
        Some((tree.root().rect(), submenus))
    }

    /// Push window bounds and hit regions for the current visibility state.
    fn sync_backend(&mut self) {
        let Some((root, submenus)) = self.visible_rects() else {
            return;
        };
        let mut all = Vec::with_capacity(submenus.len() + 1);
        all.push(root);
        all.extend_from_slice(&submenus);

        let bounds = window_bounds(&self.screen, &all, self.config.placement.window_padding);
        let main = hit_region(&self.screen, root);
        let regions: Vec<PhysicalRect> = submenus
            .iter()
            .map(|&r| hit_region(&self.screen, r))
            .collect();

        self.bridge.resize(bounds);
        self.bridge.update_regions(main, &regions);
    }

    /// Drop everything left over from a previous cycle.
    fn reset_transient(&mut self) {
        self.timers.clear();
        self.previews.clear();
        self.chain.clear();
        self.hover.clear();
        self.pointer = None;
        if let Some(mut tree) = self.tree.take() {
            tree.hide_all();
            self.surface.present(&tree);
        }
        self.screen.window_origin = Point::default();
    }
}
