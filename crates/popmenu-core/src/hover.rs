//! Hover-intent state for submenus and previews.
//!
//! Each submenu panel has a small state object: open or closed, plus the
//! handle of a pending close timer. Transitions cancel that timer, so at most
//! one is ever outstanding per submenu.

use std::collections::HashMap;

use crate::timers::TimerId;
use crate::tree::PanelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmenuState {
    #[default]
    Closed,
    Open,
}

/// Hover state for one submenu panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmenuHover {
    pub state: SubmenuState,
    pub pending_close: Option<TimerId>,
}

impl SubmenuHover {
    /// Mark open and hand back any close timer that must be cancelled.
    pub fn open(&mut self) -> Option<TimerId> {
        self.state = SubmenuState::Open;
        self.pending_close.take()
    }

    /// Mark closed and hand back any close timer that must be cancelled.
    pub fn close(&mut self) -> Option<TimerId> {
        self.state = SubmenuState::Closed;
        self.pending_close.take()
    }
}

/// The open submenu panels, one per depth, root excluded.
///
/// Index 0 holds the depth-1 submenu, index 1 the depth-2 one, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverChain {
    open_by_depth: Vec<PanelId>,
}

impl HoverChain {
    pub fn panels(&self) -> &[PanelId] {
        &self.open_by_depth
    }

    pub fn is_empty(&self) -> bool {
        self.open_by_depth.is_empty()
    }

    /// Open `panel` at `depth` (>= 1).
    ///
    /// Whatever was open at that depth or deeper is closed and returned,
    /// except `panel` itself when it was already open.
    pub fn open(&mut self, panel: PanelId, depth: usize) -> Vec<PanelId> {
        debug_assert!(depth >= 1, "the root is not part of the hover chain");
        let keep = depth.saturating_sub(1).min(self.open_by_depth.len());
        let closed = self
            .open_by_depth
            .split_off(keep)
            .into_iter()
            .filter(|&p| p != panel)
            .collect();
        self.open_by_depth.push(panel);
        closed
    }

    /// Close `panel` and everything opened beneath it.
    pub fn close(&mut self, panel: PanelId) -> Vec<PanelId> {
        match self.open_by_depth.iter().position(|&p| p == panel) {
            Some(index) => self.open_by_depth.split_off(index),
            None => Vec::new(),
        }
    }

    /// Close everything.
    pub fn clear(&mut self) -> Vec<PanelId> {
        std::mem::take(&mut self.open_by_depth)
    }
}

/// Per-submenu hover states, created lazily.
#[derive(Debug, Clone, Default)]
pub struct HoverStates {
    submenus: HashMap<PanelId, SubmenuHover>,
}

impl HoverStates {
    pub fn entry(&mut self, panel: PanelId) -> &mut SubmenuHover {
        self.submenus.entry(panel).or_default()
    }

    pub fn clear(&mut self) {
        self.submenus.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;
    use crate::tree::PanelTree;
    use crate::units::Size;

    fn ids() -> (PanelId, PanelId, PanelId) {
        // root -> a (-> a1), b
        let items = vec![
            MenuItem::new("a", "A").with_children(vec![
                MenuItem::new("a1", "A1").with_children(vec![MenuItem::new("x", "X")]),
            ]),
            MenuItem::new("b", "B").with_children(vec![MenuItem::new("y", "Y")]),
        ];
        let tree = PanelTree::build(&items, Size::new(200.0, 400.0));
        let a = tree.root().rows[0].submenu.unwrap();
        let a1 = tree.get(a).unwrap().rows[0].submenu.unwrap();
        let b = tree.root().rows[1].submenu.unwrap();
        (a, a1, b)
    }

    #[test]
    fn test_open_sibling_closes_branch() {
        let (a, a1, b) = ids();
        let mut chain = HoverChain::default();

        assert!(chain.open(a, 1).is_empty());
        assert!(chain.open(a1, 2).is_empty());
        assert_eq!(chain.panels(), &[a, a1]);

        let closed = chain.open(b, 1);
        assert_eq!(closed, vec![a, a1]);
        assert_eq!(chain.panels(), &[b]);
    }

    #[test]
    fn test_reopen_same_panel_closes_deeper_only() {
        let (a, a1, _) = ids();
        let mut chain = HoverChain::default();
        chain.open(a, 1);
        chain.open(a1, 2);

        assert_eq!(chain.open(a, 1), vec![a1]);
        assert_eq!(chain.panels(), &[a]);
    }

    #[test]
    fn test_close_truncates_descendants() {
        let (a, a1, b) = ids();
        let mut chain = HoverChain::default();
        chain.open(a, 1);
        chain.open(a1, 2);

        assert!(chain.close(b).is_empty());
        assert_eq!(chain.close(a), vec![a, a1]);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_submenu_hover_transitions_hand_back_timer() {
        let mut hover = SubmenuHover::default();
        assert_eq!(hover.state, SubmenuState::Closed);
        assert_eq!(hover.open(), None);
        assert_eq!(hover.state, SubmenuState::Open);
        assert_eq!(hover.close(), None);
        assert_eq!(hover.state, SubmenuState::Closed);
    }
}
