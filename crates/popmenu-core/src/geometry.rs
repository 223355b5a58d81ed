//! Placement math for the root panel and its submenus.
//!
//! These functions are pure and carry no rendering state. Panel rectangles are
//! in CSS pixels relative to the overlay window; screen bounds, the cursor and
//! the window origin are in logical units relative to the monitor.

use serde::Serialize;

use crate::config::PlacementConfig;
use crate::units::{PhysicalRect, Point, Rect, Scales, Size};

/// Monitor and window state a render pass is planned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenContext {
    /// Monitor top-left in physical pixels.
    pub monitor_origin: Point,

    /// Monitor size in logical units.
    pub monitor_size: Size,

    pub scales: Scales,
    pub is_tray_menu: bool,

    /// Overlay window top-left, logical units relative to the monitor.
    pub window_origin: Point,
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self {
            monitor_origin: Point::default(),
            monitor_size: Size::new(1920.0, 1080.0),
            scales: Scales::default(),
            is_tray_menu: false,
            window_origin: Point::default(),
        }
    }
}

impl ScreenContext {
    /// Reserved space at the bottom of the monitor; only tray menus have one.
    pub fn bottom_margin(&self, placement: &PlacementConfig) -> f64 {
        if self.is_tray_menu {
            placement.tray_bottom_margin
        } else {
            0.0
        }
    }

    /// Monitor height minus the bottom margin.
    pub fn usable_height(&self, placement: &PlacementConfig) -> f64 {
        self.monitor_size.height - self.bottom_margin(placement)
    }

    /// Window origin in physical desktop coordinates.
    pub fn window_physical_origin(&self) -> Point {
        Point::new(
            self.monitor_origin.x + self.scales.to_physical(self.window_origin.x),
            self.monitor_origin.y + self.scales.to_physical(self.window_origin.y),
        )
    }
}

/// Result of placing the root panel at the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootPlacement {
    /// New overlay window origin (logical, monitor-relative).
    pub window_origin: Point,

    /// Root panel position inside the window (CSS pixels).
    pub panel_position: Point,

    /// Menu extent including chrome, logical and monitor-relative.
    pub menu_rect: Rect,
}

/// Place the root panel so the whole menu stays on the monitor.
///
/// `panel_size` is the root panel's natural size in CSS pixels; chrome
/// padding and the shadow margin are added here. Normal menus clamp to the
/// monitor; tray menus hang upward from the cursor. The window origin then
/// trails the menu by at most `max_window_offset` CSS pixels.
pub fn place_root(
    screen: &ScreenContext,
    cursor: Point,
    panel_size: Size,
    placement: &PlacementConfig,
) -> RootPlacement {
    let scales = &screen.scales;
    let chrome = placement.body_padding * 2.0 + placement.shadow_margin;
    let menu_w = scales.to_logical(panel_size.width + chrome);
    let menu_h = scales.to_logical(panel_size.height + chrome);

    let screen_w = screen.monitor_size.width;
    let screen_h = screen.usable_height(placement);

    let left = cursor.x.min(screen_w - menu_w).max(0.0);
    let top = if screen.is_tray_menu {
        (cursor.y - menu_h).max(0.0)
    } else {
        cursor.y.min(screen_h - menu_h).max(0.0)
    };

    let left_space = scales.to_css(left).min(placement.max_window_offset);
    let top_space = scales.to_css(top).min(placement.max_window_offset);

    RootPlacement {
        window_origin: Point::new(
            left - scales.to_logical(left_space),
            top - scales.to_logical(top_space),
        ),
        panel_position: Point::new(left_space.round(), top_space.round()),
        menu_rect: Rect::new(left, top, menu_w, menu_h),
    }
}

/// Which side of its parent a submenu opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Left,
}

/// Result of placing a submenu next to its parent panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmenuPlacement {
    pub side: Side,
    /// Submenu top-left inside the window (CSS pixels).
    pub position: Point,
}

/// Place a submenu beside `parent`, level with the hovered row.
///
/// - Opens right when there is room on the right, or when the left has no
///   room either; otherwise opens left.
/// - Shifts up by the bottom overflow, then back down by any top overflow,
///   so a submenu taller than the screen is pinned to the top edge.
///
/// `row_top` is the hovered row's top relative to the parent's top edge;
/// `submenu_size` is the submenu's on-screen (capped) size.
pub fn place_submenu(
    screen: &ScreenContext,
    parent: Rect,
    row_top: f64,
    submenu_size: Size,
    placement: &PlacementConfig,
) -> SubmenuPlacement {
    let scales = &screen.scales;
    let origin = screen.window_origin;
    let screen_w = screen.monitor_size.width - origin.x;
    let screen_h = screen.usable_height(placement) - origin.y;

    let submenu_w = scales.to_logical(submenu_size.width);
    let space_right = screen_w - scales.to_logical(parent.right());
    let space_left = scales.to_logical(parent.x) + origin.x;

    let (side, x) = if space_right >= submenu_w || space_left < submenu_w {
        (Side::Right, parent.right())
    } else {
        (Side::Left, parent.x - submenu_size.width)
    };

    let mut top = parent.y + row_top;
    let bottom_space = screen_h - scales.to_logical(top + submenu_size.height);
    if bottom_space < 0.0 {
        top += scales.to_css(bottom_space);
    }
    let top_space = scales.to_logical(top) + origin.y;
    if top_space < 0.0 {
        top -= scales.to_css(top_space);
    }

    SubmenuPlacement {
        side,
        position: Point::new(x, top),
    }
}

/// Overlay window size and position as sent to the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowBounds {
    /// CSS pixels, rounded up.
    pub width: f64,
    pub height: f64,
    /// Physical desktop pixels.
    pub x: f64,
    pub y: f64,
}

/// Window bounds covering the union of `visible` panel rects plus padding.
pub fn window_bounds(screen: &ScreenContext, visible: &[Rect], padding: f64) -> WindowBounds {
    let (max_x, max_y) = visible.iter().fold((0.0_f64, 0.0_f64), |(x, y), r| {
        (x.max(r.right()), y.max(r.bottom()))
    });
    let origin = screen.window_physical_origin();

    WindowBounds {
        width: (max_x + padding).ceil(),
        height: (max_y + padding).ceil(),
        x: origin.x,
        y: origin.y,
    }
}

/// Map a window CSS rect to a physical hit-test region.
pub fn hit_region(screen: &ScreenContext, rect: Rect) -> PhysicalRect {
    let origin = screen.window_physical_origin();
    let scale = screen.scales.css_to_physical(1.0);

    PhysicalRect {
        x: (origin.x + rect.x * scale).round() as i32,
        y: (origin.y + rect.y * scale).round() as i32,
        width: (rect.width * scale).round() as i32,
        height: (rect.height * scale).round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(width: f64, height: f64) -> ScreenContext {
        ScreenContext {
            monitor_size: Size::new(width, height),
            ..Default::default()
        }
    }

    fn placement() -> PlacementConfig {
        PlacementConfig::default()
    }

    // Chrome added by place_root with the default config: 8 * 2 + 5.
    const CHROME: f64 = 21.0;

    #[test]
    fn test_root_at_cursor_when_it_fits() {
        let s = screen(1920.0, 1080.0);
        let p = place_root(&s, Point::new(100.0, 150.0), Size::new(150.0, 200.0), &placement());

        assert_eq!(p.menu_rect.x, 100.0);
        assert_eq!(p.menu_rect.y, 150.0);
        assert_eq!(p.panel_position, Point::new(100.0, 150.0));
        assert_eq!(p.window_origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_root_window_origin_trails_by_max_offset() {
        let s = screen(1920.0, 1080.0);
        let p = place_root(&s, Point::new(800.0, 500.0), Size::new(150.0, 200.0), &placement());

        assert_eq!(p.panel_position, Point::new(210.0, 210.0));
        assert_eq!(p.window_origin, Point::new(590.0, 290.0));
    }

    #[test]
    fn test_root_clamped_at_right_and_bottom_edges() {
        let s = screen(800.0, 600.0);
        let size = Size::new(150.0, 200.0);
        let p = place_root(&s, Point::new(790.0, 590.0), size, &placement());

        assert_eq!(p.menu_rect.x, 800.0 - (150.0 + CHROME));
        assert_eq!(p.menu_rect.y, 600.0 - (200.0 + CHROME));
        assert!(p.menu_rect.right() <= 800.0);
        assert!(p.menu_rect.bottom() <= 600.0);
    }

    #[test]
    fn test_root_always_on_screen_for_normal_menus() {
        let s = screen(1000.0, 700.0);
        let cfg = placement();
        for &cx in &[-50.0, 0.0, 10.0, 400.0, 900.0, 999.0, 1500.0] {
            for &cy in &[-10.0, 0.0, 300.0, 650.0, 699.0, 2000.0] {
                for &(w, h) in &[(50.0, 40.0), (180.0, 300.0), (400.0, 600.0)] {
                    let p = place_root(&s, Point::new(cx, cy), Size::new(w, h), &cfg);
                    let r = p.menu_rect;
                    assert!(r.x >= 0.0 && r.y >= 0.0, "near edge overflow at {cx},{cy}");
                    assert!(r.right() <= 1000.0 + 1e-9, "right overflow at {cx},{cy}");
                    assert!(r.bottom() <= 700.0 + 1e-9, "bottom overflow at {cx},{cy}");
                }
            }
        }
    }

    #[test]
    fn test_root_larger_than_screen_pins_to_near_edge() {
        let s = screen(300.0, 200.0);
        let p = place_root(&s, Point::new(100.0, 100.0), Size::new(500.0, 400.0), &placement());
        assert_eq!(p.menu_rect.x, 0.0);
        assert_eq!(p.menu_rect.y, 0.0);
    }

    #[test]
    fn test_tray_menu_anchors_bottom_at_cursor() {
        let mut s = screen(1920.0, 1080.0);
        s.is_tray_menu = true;
        let size = Size::new(150.0, 200.0);
        let p = place_root(&s, Point::new(1700.0, 1075.0), size, &placement());

        assert_eq!(p.menu_rect.bottom(), 1075.0);
        assert_eq!(p.menu_rect.y, 1075.0 - (200.0 + CHROME));
    }

    #[test]
    fn test_tray_menu_clamped_at_top() {
        let mut s = screen(1920.0, 1080.0);
        s.is_tray_menu = true;
        let p = place_root(&s, Point::new(10.0, 50.0), Size::new(150.0, 200.0), &placement());
        assert_eq!(p.menu_rect.y, 0.0);
    }

    #[test]
    fn test_root_with_text_scale() {
        let mut s = screen(1920.0, 1080.0);
        s.scales = Scales::new(1.0, 2.0);
        let p = place_root(&s, Point::new(1000.0, 100.0), Size::new(100.0, 100.0), &placement());

        // Logical left 1000 is 500 CSS pixels away, capped at 210 CSS = 420 logical.
        assert_eq!(p.menu_rect.width, 242.0);
        assert_eq!(p.panel_position.x, 210.0);
        assert_eq!(p.window_origin.x, 580.0);
        assert_eq!(p.panel_position.y, 50.0);
        assert_eq!(p.window_origin.y, 0.0);
    }

    #[test]
    fn test_submenu_opens_left_when_right_is_short() {
        // Right edge at 500 on a 600 wide screen: 100 on the right, 400 on the left.
        let s = screen(600.0, 800.0);
        let parent = Rect::new(400.0, 0.0, 100.0, 300.0);
        let p = place_submenu(&s, parent, 0.0, Size::new(150.0, 100.0), &placement());

        assert_eq!(p.side, Side::Left);
        assert_eq!(p.position.x, 250.0);
    }

    #[test]
    fn test_submenu_opens_right_when_room() {
        let s = screen(600.0, 800.0);
        let parent = Rect::new(10.0, 0.0, 100.0, 300.0);
        let p = place_submenu(&s, parent, 0.0, Size::new(150.0, 100.0), &placement());

        assert_eq!(p.side, Side::Right);
        assert_eq!(p.position.x, 110.0);
    }

    #[test]
    fn test_submenu_prefers_right_when_both_sides_short() {
        let s = screen(300.0, 800.0);
        let parent = Rect::new(100.0, 0.0, 100.0, 300.0);
        let p = place_submenu(&s, parent, 0.0, Size::new(150.0, 100.0), &placement());
        assert_eq!(p.side, Side::Right);
    }

    #[test]
    fn test_submenu_left_space_counts_window_origin() {
        let mut s = screen(1000.0, 800.0);
        s.window_origin = Point::new(600.0, 0.0);
        // Parent spans window x 100..300, i.e. monitor x 700..900.
        let parent = Rect::new(100.0, 0.0, 200.0, 300.0);
        let p = place_submenu(&s, parent, 0.0, Size::new(150.0, 100.0), &placement());
        assert_eq!(p.side, Side::Left);
        assert_eq!(p.position.x, -50.0);
    }

    #[test]
    fn test_submenu_aligned_with_row() {
        let s = screen(1920.0, 1080.0);
        let parent = Rect::new(10.0, 40.0, 100.0, 300.0);
        let p = place_submenu(&s, parent, 60.0, Size::new(150.0, 100.0), &placement());
        assert_eq!(p.position.y, 100.0);
    }

    #[test]
    fn test_submenu_shifted_up_by_bottom_overflow() {
        let s = screen(1920.0, 600.0);
        let parent = Rect::new(10.0, 300.0, 100.0, 280.0);
        let p = place_submenu(&s, parent, 200.0, Size::new(150.0, 150.0), &placement());
        // Would span 500..650; shifted up by 50.
        assert_eq!(p.position.y, 450.0);
    }

    #[test]
    fn test_submenu_tray_margin_reserved() {
        let mut s = screen(1920.0, 600.0);
        s.is_tray_menu = true;
        let parent = Rect::new(10.0, 300.0, 100.0, 280.0);
        let p = place_submenu(&s, parent, 200.0, Size::new(150.0, 150.0), &placement());
        // Usable height is 550.
        assert_eq!(p.position.y, 400.0);
    }

    #[test]
    fn test_submenu_taller_than_screen_pinned_to_top() {
        let mut s = screen(1920.0, 300.0);
        s.window_origin = Point::new(0.0, 20.0);
        let parent = Rect::new(10.0, 100.0, 100.0, 100.0);
        let p = place_submenu(&s, parent, 10.0, Size::new(150.0, 400.0), &placement());
        // Top lands on the monitor's top edge: window y -20.
        assert_eq!(p.position.y, -20.0);
    }

    #[test]
    fn test_window_bounds_union_and_padding() {
        let mut s = screen(1920.0, 1080.0);
        s.monitor_origin = Point::new(1920.0, 0.0);
        s.scales = Scales::new(2.0, 1.0);
        s.window_origin = Point::new(100.0, 50.0);

        let rects = [
            Rect::new(10.0, 10.0, 150.5, 200.0),
            Rect::new(160.5, 40.0, 120.0, 300.2),
        ];
        let bounds = window_bounds(&s, &rects, 10.0);
        assert_eq!(bounds.width, 291.0);
        assert_eq!(bounds.height, 351.0);
        assert_eq!(bounds.x, 2120.0);
        assert_eq!(bounds.y, 100.0);
    }

    #[test]
    fn test_hit_region_uses_both_scales() {
        let mut s = screen(1920.0, 1080.0);
        s.monitor_origin = Point::new(0.0, 1080.0);
        s.scales = Scales::new(1.5, 1.25);
        s.window_origin = Point::new(10.0, 20.0);

        let region = hit_region(&s, Rect::new(8.0, 16.0, 100.0, 40.0));
        assert_eq!(
            region,
            PhysicalRect {
                x: 30,
                y: 1140,
                width: 188,
                height: 75,
            }
        );
    }
}
