//! Panel tree built from a menu item hierarchy.
//!
//! Every item with children gets its own submenu panel up front, hidden until
//! its ancestor chain is hovered. Panels live in a flat arena indexed by
//! [`PanelId`]; index 0 is always the root.

use std::path::PathBuf;

use crate::menu::{IconSlot, MenuItem};
use crate::units::{Point, Rect, Size};

/// Index of a panel inside a [`PanelTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(usize);

impl PanelId {
    pub const ROOT: PanelId = PanelId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a submenu panel hangs off its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub panel: PanelId,
    pub row: usize,
}

/// A pointer location resolved against the tree.
///
/// `row` is `None` over panel padding and separators, which take no input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTarget {
    pub panel: PanelId,
    pub row: Option<usize>,
}

impl HitTarget {
    pub fn row(panel: PanelId, row: usize) -> Self {
        Self {
            panel,
            row: Some(row),
        }
    }

    pub fn panel(panel: PanelId) -> Self {
        Self { panel, row: None }
    }
}

/// One rendered line of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// `None` for separators.
    pub item_id: Option<String>,

    /// Full label, reported untouched.
    pub label: String,

    /// Label as drawn, possibly ellipsized by the layout engine.
    pub display_label: String,

    pub icon: IconSlot,
    pub disabled: bool,
    pub separator: bool,
    pub submenu: Option<PanelId>,
    pub preview_image: Option<PathBuf>,

    /// Top of the row relative to the panel content, in CSS pixels.
    pub offset: f64,
    pub height: f64,
}

impl Row {
    fn from_item(item: &MenuItem) -> Self {
        if item.is_separator() {
            return Self {
                item_id: None,
                label: String::new(),
                display_label: String::new(),
                icon: IconSlot::Blank,
                disabled: true,
                separator: true,
                submenu: None,
                preview_image: None,
                offset: 0.0,
                height: 0.0,
            };
        }

        Self {
            item_id: Some(item.id.clone()),
            label: item.label.clone(),
            display_label: item.label.clone(),
            icon: item.icon_slot(),
            disabled: item.disabled,
            separator: false,
            submenu: None,
            preview_image: item.preview_image.clone(),
            offset: 0.0,
            height: 0.0,
        }
    }

    /// Accepts clicks and hover.
    pub fn is_interactive(&self) -> bool {
        !self.separator && !self.disabled
    }
}

/// Measured geometry of a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMetrics {
    pub offset: f64,
    pub height: f64,
    pub display_label: String,
}

/// Natural size of a panel and its rows after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelMetrics {
    pub content_size: Size,
    pub rows: Vec<RowMetrics>,
}

/// One rendered menu surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    pub parent: Option<ParentLink>,

    /// 0 for the root, 1 for its submenus, and so on.
    pub depth: usize,

    pub rows: Vec<Row>,

    /// Natural size in CSS pixels; zero until measured.
    pub content_size: Size,

    /// Size cap; content beyond it scrolls.
    pub max_size: Option<Size>,

    /// Top-left corner in CSS pixels, relative to the overlay window.
    pub position: Point,

    pub visible: bool,
    pub scroll_offset: f64,

    /// Whether the scroll affordance is shown.
    pub has_scroll: bool,
}

impl Panel {
    fn new(id: PanelId, parent: Option<ParentLink>, depth: usize, max_size: Option<Size>) -> Self {
        Self {
            id,
            parent,
            depth,
            rows: Vec::new(),
            content_size: Size::default(),
            max_size,
            position: Point::default(),
            visible: false,
            scroll_offset: 0.0,
            has_scroll: false,
        }
    }

    /// On-screen size: natural size clamped to the cap.
    pub fn visible_size(&self) -> Size {
        match self.max_size {
            Some(max) => Size::new(
                self.content_size.width.min(max.width),
                self.content_size.height.min(max.height),
            ),
            None => self.content_size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.visible_size())
    }

    /// Row top relative to the panel's visible top edge.
    pub fn row_top(&self, row: usize) -> Option<f64> {
        self.rows.get(row).map(|r| r.offset - self.scroll_offset)
    }

    fn max_scroll(&self) -> f64 {
        (self.content_size.height - self.visible_size().height).max(0.0)
    }

    /// Recompute the scroll affordance and keep the offset in range.
    pub fn update_scroll_indicator(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll());
        self.has_scroll = self.content_size.height > self.visible_size().height;
    }

    /// Scroll by `delta` CSS pixels, clamped to the content.
    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_offset += delta;
        self.update_scroll_indicator();
    }

    fn apply_metrics(&mut self, metrics: PanelMetrics) {
        self.content_size = metrics.content_size;
        for (row, m) in self.rows.iter_mut().zip(metrics.rows) {
            row.offset = m.offset;
            row.height = m.height;
            row.display_label = m.display_label;
        }
        self.update_scroll_indicator();
    }

    /// Row under a point given in window CSS coordinates.
    fn row_at(&self, point: Point) -> Option<usize> {
        let local_y = point.y - self.position.y + self.scroll_offset;
        self.rows
            .iter()
            .position(|r| local_y >= r.offset && local_y < r.offset + r.height)
            .filter(|&i| !self.rows[i].separator)
    }
}

/// Arena of all panels for one menu session.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelTree {
    panels: Vec<Panel>,
}

impl PanelTree {
    /// Build the full tree. Submenu panels are capped at `submenu_max`.
    pub fn build(items: &[MenuItem], submenu_max: Size) -> Self {
        let mut tree = Self {
            panels: vec![Panel::new(PanelId::ROOT, None, 0, None)],
        };
        tree.fill(PanelId::ROOT, items, submenu_max);
        tracing::debug!("Built menu tree with {} panels", tree.panels.len());
        tree
    }

    fn fill(&mut self, panel: PanelId, items: &[MenuItem], submenu_max: Size) {
        let depth = self.panels[panel.0].depth;
        for (index, item) in items.iter().enumerate() {
            let mut row = Row::from_item(item);
            if item.has_submenu() {
                let child = PanelId(self.panels.len());
                let link = ParentLink { panel, row: index };
                self.panels
                    .push(Panel::new(child, Some(link), depth + 1, Some(submenu_max)));
                self.fill(child, &item.children, submenu_max);
                row.submenu = Some(child);
            }
            self.panels[panel.0].rows.push(row);
        }
    }

    pub fn root(&self) -> &Panel {
        &self.panels[0]
    }

    pub fn root_mut(&mut self) -> &mut Panel {
        &mut self.panels[0]
    }

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id.0)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id.0)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().rows.is_empty()
    }

    pub fn row(&self, target: HitTarget) -> Option<&Row> {
        let index = target.row?;
        self.get(target.panel)?.rows.get(index)
    }

    /// Locate the row carrying `item_id`.
    pub fn find_row(&self, item_id: &str) -> Option<HitTarget> {
        self.panels.iter().find_map(|panel| {
            panel
                .rows
                .iter()
                .position(|r| r.item_id.as_deref() == Some(item_id))
                .map(|row| HitTarget::row(panel.id, row))
        })
    }

    /// True when `panel` is `ancestor` or nested anywhere below it.
    pub fn is_within(&self, panel: PanelId, ancestor: PanelId) -> bool {
        let mut current = Some(panel);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|p| p.parent).map(|link| link.panel);
        }
        false
    }

    /// Store measured metrics for a panel.
    pub fn apply_metrics(&mut self, id: PanelId, metrics: PanelMetrics) {
        if let Some(panel) = self.get_mut(id) {
            panel.apply_metrics(metrics);
        }
    }

    pub fn visible_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.visible)
    }

    /// Hide every panel, root included.
    pub fn hide_all(&mut self) {
        for panel in &mut self.panels {
            panel.visible = false;
        }
    }

    /// Resolve a window CSS coordinate to a panel and row.
    ///
    /// Deeper panels are drawn on top, so they are tested first.
    pub fn hit_test(&self, point: Point) -> Option<HitTarget> {
        self.panels
            .iter()
            .filter(|p| p.visible && p.rect().contains(point))
            .max_by_key(|p| p.depth)
            .map(|p| HitTarget {
                panel: p.id,
                row: p.row_at(point),
            })
    }
}
