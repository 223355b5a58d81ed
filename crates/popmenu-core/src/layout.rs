//! Rendering surface seam and a text-metric layout engine.
//!
//! A surface is committed first and measured later: the session only asks for
//! panel sizes after the host reports that layout has settled, because a
//! retained-layout engine reports zero sizes for content it has not laid out.

use crate::config::LayoutConfig;
use crate::theme::Appearance;
use crate::tree::{Panel, PanelMetrics, PanelTree, RowMetrics};
use crate::units::Size;

const ELLIPSIS: char = '…';

/// The retained-layout surface the panels are drawn on.
pub trait RenderSurface {
    /// Insert every panel of `tree`, hidden ones included.
    fn commit(&mut self, tree: &PanelTree);

    /// Natural metrics of `panel`, or `None` if layout has not run yet.
    fn measure(&self, panel: &Panel) -> Option<PanelMetrics>;

    fn set_appearance(&mut self, appearance: Appearance);

    /// Reflect visibility, position and scroll changes.
    fn present(&mut self, tree: &PanelTree);
}

/// Shorten `label` to at most `max_chars` characters, ending in an ellipsis.
pub fn ellipsize(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = label.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Deterministic layout from fixed row heights and an average glyph width.
///
/// Used by headless hosts and tests in place of a real text shaper.
#[derive(Debug, Clone)]
pub struct EstimatedLayout {
    metrics: LayoutConfig,
    committed: bool,
    appearance: Option<Appearance>,
    presented: usize,
}

impl EstimatedLayout {
    pub fn new(metrics: LayoutConfig) -> Self {
        Self {
            metrics,
            committed: false,
            appearance: None,
            presented: 0,
        }
    }

    pub fn appearance(&self) -> Option<Appearance> {
        self.appearance
    }

    /// Number of `present` calls since construction.
    pub fn present_count(&self) -> usize {
        self.presented
    }

    fn max_label_chars(&self) -> usize {
        (self.metrics.label_max_width / self.metrics.char_width).floor() as usize
    }

    fn label_width(&self, label: &str) -> f64 {
        let chars = label.chars().count() as f64;
        (chars * self.metrics.char_width).min(self.metrics.label_max_width)
    }
}

impl RenderSurface for EstimatedLayout {
    fn commit(&mut self, tree: &PanelTree) {
        tracing::trace!("Committed {} panels to estimated layout", tree.len());
        self.committed = true;
    }

    fn measure(&self, panel: &Panel) -> Option<PanelMetrics> {
        if !self.committed {
            return None;
        }

        let m = &self.metrics;
        let max_chars = self.max_label_chars();
        let mut y = m.panel_padding;
        let mut widest_label: f64 = 0.0;
        let mut rows = Vec::with_capacity(panel.rows.len());

        for row in &panel.rows {
            let height = if row.separator {
                m.separator_height
            } else {
                m.row_height
            };
            let display_label = ellipsize(&row.label, max_chars);
            widest_label = widest_label.max(self.label_width(&display_label));
            rows.push(RowMetrics {
                offset: y,
                height,
                display_label,
            });
            y += height;
        }

        let indicator = if panel.rows.iter().any(|r| r.submenu.is_some()) {
            m.indicator_column
        } else {
            0.0
        };
        let width = (m.icon_column + widest_label + indicator + m.panel_padding * 2.0)
            .max(m.min_panel_width);

        Some(PanelMetrics {
            content_size: Size::new(width, y + m.panel_padding),
            rows,
        })
    }

    fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = Some(appearance);
    }

    fn present(&mut self, _tree: &PanelTree) {
        self.presented += 1;
    }
}
