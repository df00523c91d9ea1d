//! Overlay hit zones
//!
//! Named rectangles in screen space that map taps to navigation actions.
//! The default layout puts a "prev" strip along the left edge and a
//! "next" strip along the right edge, full height, so the zones are easy
//! to hit without looking.

use crate::cycle::Direction;

/// A tappable screen region bound to a navigation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayZone {
    /// Zone name, for logs
    pub name: &'static str,
    /// Navigation this zone triggers
    pub direction: Direction,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl OverlayZone {
    /// Create a zone from its top-left corner and size
    pub fn new(
        name: &'static str,
        direction: Direction,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name,
            direction,
            x,
            y,
            width,
            height,
        }
    }

    /// Whether a screen point falls inside this zone
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// The static set of overlay zones for one screen layout
#[derive(Debug, Clone)]
pub struct OverlayLayout {
    zones: Vec<OverlayZone>,
}

impl OverlayLayout {
    /// Prev/next strips along the left and right screen edges
    ///
    /// The strip width is capped at half the screen so the zones can
    /// never overlap on narrow panels.
    pub fn edge_strips(width: u32, height: u32, button_width: u32) -> Self {
        let strip = button_width.min(width / 2);
        Self {
            zones: vec![
                OverlayZone::new("prev", Direction::Prev, 0, 0, strip, height),
                OverlayZone::new("next", Direction::Next, width - strip, 0, strip, height),
            ],
        }
    }

    /// The zone containing the point, if any
    pub fn hit_test(&self, x: u32, y: u32) -> Option<&OverlayZone> {
        self.zones.iter().find(|zone| zone.contains(x, y))
    }
}
