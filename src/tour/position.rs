//! Tooltip placement — a pure function from target geometry to coordinates.
//!
//! The tooltip is placed flush against the requested edge of the target and
//! then clamped into the padded viewport. Clamping wins over exact placement:
//! a tooltip that would spill off-screen is pulled back in, even if that means
//! it overlaps its target.

use serde::{Deserialize, Serialize};

/// Which edge of the target the tooltip attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        };
        f.pad(s)
    }
}

/// Viewport-relative bounding rectangle of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether any part of the rect lies outside `viewport`.
    pub fn exceeds(&self, viewport: Viewport) -> bool {
        self.top < 0.0
            || self.left < 0.0
            || self.bottom() > viewport.height
            || self.right() > viewport.width
    }
}

/// Visible window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Fixed tooltip size and spacing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipGeometry {
    pub width: f64,
    pub height: f64,
    /// Gap between the target edge and the tooltip.
    pub offset: f64,
    /// Minimum distance between the tooltip and any viewport edge.
    pub padding: f64,
}

impl Default for TooltipGeometry {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 220.0,
            offset: 20.0,
            padding: 20.0,
        }
    }
}

/// Top-left corner of the tooltip, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

/// Compute the tooltip position for a target.
///
/// With no target, or `Side::Center`, the tooltip is centered in the
/// viewport. Otherwise it sits `offset` away from the requested edge, centered
/// on the perpendicular axis, and both axes are clamped into
/// `[padding, viewport - tooltip - padding]`.
pub fn compute_position(
    target: Option<Rect>,
    side: Side,
    viewport: Viewport,
    geometry: &TooltipGeometry,
) -> Position {
    let raw = match target {
        Some(rect) if side != Side::Center => edge_position(rect, side, geometry),
        _ => Position {
            top: (viewport.height - geometry.height) / 2.0,
            left: (viewport.width - geometry.width) / 2.0,
        },
    };

    Position {
        top: clamp_axis(raw.top, viewport.height, geometry.height, geometry.padding),
        left: clamp_axis(raw.left, viewport.width, geometry.width, geometry.padding),
    }
}

fn edge_position(rect: Rect, side: Side, geometry: &TooltipGeometry) -> Position {
    let centered_left = rect.left + rect.width / 2.0 - geometry.width / 2.0;
    let centered_top = rect.top + rect.height / 2.0 - geometry.height / 2.0;

    match side {
        Side::Top => Position {
            top: rect.top - geometry.height - geometry.offset,
            left: centered_left,
        },
        Side::Bottom => Position {
            top: rect.bottom() + geometry.offset,
            left: centered_left,
        },
        Side::Left => Position {
            top: centered_top,
            left: rect.left - geometry.width - geometry.offset,
        },
        Side::Right => Position {
            top: centered_top,
            left: rect.right() + geometry.offset,
        },
        Side::Center => Position {
            top: centered_top,
            left: centered_left,
        },
    }
}

/// Clamp one axis into the padded viewport. A viewport too small to hold the
/// tooltip, or any non-finite input, pins it to the leading padding.
fn clamp_axis(value: f64, viewport: f64, size: f64, padding: f64) -> f64 {
    let min = if padding.is_finite() { padding } else { 0.0 };
    let max = viewport - size - padding;
    if max.is_nan() || max < min || value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Viewport {
        Viewport::new(1024.0, 768.0)
    }

    #[test]
    fn centers_without_target() {
        let pos = compute_position(None, Side::Bottom, desktop(), &TooltipGeometry::default());
        assert_eq!(pos, Position { top: 274.0, left: 352.0 });
    }

    #[test]
    fn center_side_ignores_target() {
        let rect = Rect::new(10.0, 10.0, 50.0, 50.0);
        let pos = compute_position(Some(rect), Side::Center, desktop(), &TooltipGeometry::default());
        assert_eq!(pos, Position { top: 274.0, left: 352.0 });
    }

    #[test]
    fn bottom_sits_below_target_centered_horizontally() {
        let rect = Rect::new(100.0, 100.0, 200.0, 50.0);
        let pos = compute_position(Some(rect), Side::Bottom, desktop(), &TooltipGeometry::default());
        // 100 + 50 + 20 below; 100 + 100 - 160 across
        assert_eq!(pos, Position { top: 170.0, left: 40.0 });
    }

    #[test]
    fn bottom_clamps_left_edge_into_padding() {
        let rect = Rect::new(100.0, 0.0, 40.0, 50.0);
        let pos = compute_position(Some(rect), Side::Bottom, desktop(), &TooltipGeometry::default());
        assert_eq!(pos.left, 20.0);
        assert_eq!(pos.top, 170.0);
    }

    #[test]
    fn right_clamps_against_viewport_width() {
        let rect = Rect::new(300.0, 950.0, 50.0, 40.0);
        let pos = compute_position(Some(rect), Side::Right, desktop(), &TooltipGeometry::default());
        assert_eq!(pos.left, 1024.0 - 320.0 - 20.0);
        // 300 + 20 - 110
        assert_eq!(pos.top, 210.0);
    }

    #[test]
    fn top_and_left_place_before_target() {
        let geometry = TooltipGeometry::default();
        let rect = Rect::new(500.0, 600.0, 100.0, 40.0);

        let top = compute_position(Some(rect), Side::Top, desktop(), &geometry);
        assert_eq!(top, Position { top: 260.0, left: 490.0 });

        let left = compute_position(Some(rect), Side::Left, desktop(), &geometry);
        assert_eq!(left, Position { top: 410.0, left: 260.0 });
    }

    #[test]
    fn top_near_viewport_edge_overlaps_rather_than_escapes() {
        let rect = Rect::new(30.0, 400.0, 100.0, 40.0);
        let pos = compute_position(Some(rect), Side::Top, desktop(), &TooltipGeometry::default());
        assert_eq!(pos.top, 20.0);
    }

    #[test]
    fn stays_within_bounds_for_many_inputs() {
        let geometry = TooltipGeometry::default();
        let viewport = desktop();
        let sides = [Side::Top, Side::Bottom, Side::Left, Side::Right, Side::Center];
        for side in sides {
            for top in (-400..1400).step_by(97) {
                for left in (-400..1600).step_by(113) {
                    let rect = Rect::new(top as f64, left as f64, 120.0, 60.0);
                    let pos = compute_position(Some(rect), side, viewport, &geometry);
                    assert!(pos.left >= 20.0 && pos.left <= 1024.0 - 320.0 - 20.0, "{side} {pos:?}");
                    assert!(pos.top >= 20.0 && pos.top <= 768.0 - 220.0 - 20.0, "{side} {pos:?}");
                }
            }
        }
    }

    #[test]
    fn deterministic() {
        let rect = Some(Rect::new(123.5, 77.25, 10.0, 300.0));
        let geometry = TooltipGeometry::default();
        let a = compute_position(rect, Side::Left, desktop(), &geometry);
        let b = compute_position(rect, Side::Left, desktop(), &geometry);
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_viewport_pins_to_padding() {
        let pos = compute_position(None, Side::Center, Viewport::new(200.0, 100.0), &TooltipGeometry::default());
        assert_eq!(pos, Position { top: 20.0, left: 20.0 });
    }

    #[test]
    fn non_finite_geometry_never_panics() {
        let viewport = desktop();
        for geometry in [
            TooltipGeometry { padding: f64::NAN, ..TooltipGeometry::default() },
            TooltipGeometry { width: f64::INFINITY, ..TooltipGeometry::default() },
            TooltipGeometry { height: f64::NAN, offset: f64::NAN, ..TooltipGeometry::default() },
        ] {
            let centered = compute_position(None, Side::Center, viewport, &geometry);
            let anchored = compute_position(Some(Rect::new(100.0, 100.0, 200.0, 50.0)), Side::Bottom, viewport, &geometry);
            for pos in [centered, anchored] {
                assert!(pos.top.is_finite() && pos.left.is_finite(), "{geometry:?} -> {pos:?}");
            }
        }

        let pos = compute_position(None, Side::Center, Viewport::new(f64::NAN, 768.0), &TooltipGeometry::default());
        assert_eq!(pos.left, 20.0);
    }

    #[test]
    fn side_serde_matches_display() {
        for side in [Side::Top, Side::Bottom, Side::Left, Side::Right, Side::Center] {
            let json = serde_json::to_string(&side).unwrap();
            assert_eq!(json, format!("\"{side}\""));
        }
        assert_eq!(Side::default(), Side::Bottom);
    }
}
