// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure geometry helpers shared by every modifier.
//!
//! All functions are total over finite inputs and never mutate their arguments.
//! Rects are Kurbo rects (`x0, y0, x1, y1`) in one coordinate space.

use kurbo::{Point, Rect, Size, Vec2};

use crate::types::{Alignment, Placement, Side, SideObject};

/// Build a rect from origin and size, the `{x, y, width, height}` form hosts usually report.
pub fn rect_from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::from_origin_size(Point::new(x, y), Size::new(width, height))
}

/// Edges of a rect as a [`SideObject`].
pub fn rect_edges(rect: Rect) -> SideObject {
    SideObject {
        top: rect.y0,
        right: rect.x1,
        bottom: rect.y1,
        left: rect.x0,
    }
}

/// Signed overflow of `rect` past each edge of `clip`.
///
/// Positive values mean `rect` sticks out past that edge by that much;
/// negative values are the remaining room.
pub fn overflow(rect: Rect, clip: Rect) -> SideObject {
    SideObject {
        top: clip.y0 - rect.y0,
        right: rect.x1 - clip.x1,
        bottom: rect.y1 - clip.y1,
        left: clip.x0 - rect.x0,
    }
}

/// Move a rect by `delta`, returning the moved copy.
pub fn translate(rect: Rect, delta: Vec2) -> Rect {
    rect + delta
}

/// Intersection of two clipping areas.
///
/// Unlike [`Rect::intersect`], disjoint inputs are not collapsed to an empty rect,
/// so overflow against the result stays meaningful (it is simply positive everywhere).
pub fn intersect_clip(a: Rect, b: Rect) -> Rect {
    Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1))
}

/// True when every coordinate is finite and the rect is not inverted.
pub fn is_valid_rect(rect: Rect) -> bool {
    rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite()
        && rect.width() >= 0.0
        && rect.height() >= 0.0
}

/// Origin of a popper of `popper` size placed against `reference`.
///
/// The side picks the main-axis position (flush against that edge of the reference);
/// the alignment picks the cross-axis position (centered, start edges flush, or end edges flush).
pub fn compute_offsets(reference: Rect, popper: Size, placement: Placement) -> Point {
    let center_x = reference.x0 + reference.width() / 2.0 - popper.width / 2.0;
    let center_y = reference.y0 + reference.height() / 2.0 - popper.height / 2.0;
    let mut origin = match placement.side() {
        Side::Top => Point::new(center_x, reference.y0 - popper.height),
        Side::Bottom => Point::new(center_x, reference.y1),
        Side::Right => Point::new(reference.x1, center_y),
        Side::Left => Point::new(reference.x0 - popper.width, center_y),
    };
    if let Some(alignment) = placement.alignment() {
        let axis = placement.cross_axis();
        let delta = axis.extent(reference) / 2.0 - axis.of_size(popper) / 2.0;
        let value = axis.of_point(origin);
        let aligned = match alignment {
            Alignment::Start => value - delta,
            Alignment::End => value + delta,
        };
        axis.set_point(&mut origin, aligned);
    }
    origin
}

/// `value` limited to `[min, max]`; when the range is inverted, `min` wins.
pub fn within(min: f64, value: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// `value` limited to `[lo, hi]`; an inverted range resolves to its midpoint.
pub fn clamp_or_midpoint(lo: f64, value: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        value.min(hi).max(lo)
    }
}

/// Per-edge distance by which `overflow` exceeds the full size of `rect`.
///
/// A value `>= 0` on an edge means the rect lies completely beyond that edge.
pub fn side_offsets(overflow: SideObject, rect: Rect, prevented: Vec2) -> SideObject {
    SideObject {
        top: overflow.top - rect.height() - prevented.y,
        right: overflow.right - rect.width() + prevented.x,
        bottom: overflow.bottom - rect.height() + prevented.y,
        left: overflow.left - rect.width() - prevented.x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Rect {
        rect_from_xywh(100.0, 100.0, 100.0, 20.0)
    }

    #[test]
    fn edges_and_xywh_agree() {
        let r = rect_from_xywh(10.0, 20.0, 30.0, 40.0);
        let e = rect_edges(r);
        assert_eq!((e.left, e.top, e.right, e.bottom), (10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn overflow_is_signed_per_edge() {
        let clip = rect_from_xywh(0.0, 0.0, 200.0, 100.0);
        let inside = rect_from_xywh(10.0, 10.0, 20.0, 20.0);
        let o = overflow(inside, clip);
        assert_eq!((o.top, o.right, o.bottom, o.left), (-10.0, -170.0, -70.0, -10.0));

        let past_right = rect_from_xywh(190.0, 10.0, 25.0, 20.0);
        assert_eq!(overflow(past_right, clip).right, 15.0);
    }

    #[test]
    fn translate_returns_a_moved_copy() {
        let r = rect_from_xywh(0.0, 0.0, 10.0, 10.0);
        let moved = translate(r, Vec2::new(5.0, -2.0));
        assert_eq!(moved, rect_from_xywh(5.0, -2.0, 10.0, 10.0));
        assert_eq!(r.origin(), Point::ZERO, "input is untouched");
    }

    #[test]
    fn offsets_for_centered_sides() {
        let size = Size::new(50.0, 10.0);
        assert_eq!(
            compute_offsets(reference(), size, Placement::BOTTOM),
            Point::new(125.0, 120.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::TOP),
            Point::new(125.0, 90.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::RIGHT),
            Point::new(200.0, 105.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::LEFT),
            Point::new(50.0, 105.0)
        );
    }

    #[test]
    fn offsets_for_aligned_placements() {
        let size = Size::new(50.0, 10.0);
        assert_eq!(
            compute_offsets(reference(), size, Placement::BOTTOM_START),
            Point::new(100.0, 120.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::BOTTOM_END),
            Point::new(150.0, 120.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::RIGHT_START),
            Point::new(200.0, 100.0)
        );
        assert_eq!(
            compute_offsets(reference(), size, Placement::LEFT_END),
            Point::new(50.0, 110.0)
        );
    }

    #[test]
    fn clamping_policies() {
        assert_eq!(within(0.0, 5.0, 10.0), 5.0);
        assert_eq!(within(0.0, -5.0, 10.0), 0.0);
        assert_eq!(within(0.0, 15.0, 10.0), 10.0);
        assert_eq!(within(10.0, 5.0, 0.0), 10.0, "inverted range prefers min");

        assert_eq!(clamp_or_midpoint(0.0, 15.0, 10.0), 10.0);
        assert_eq!(clamp_or_midpoint(10.0, 5.0, 0.0), 5.0, "midpoint of 10 and 0");
    }

    #[test]
    fn intersect_clip_keeps_disjoint_inputs_inverted() {
        let a = rect_from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = rect_from_xywh(20.0, 0.0, 10.0, 10.0);
        let c = intersect_clip(a, b);
        assert_eq!((c.x0, c.x1), (20.0, 10.0));
        assert!(!is_valid_rect(c));
    }

    #[test]
    fn invalid_rects_are_detected() {
        assert!(is_valid_rect(rect_from_xywh(0.0, 0.0, 0.0, 0.0)));
        assert!(!is_valid_rect(Rect::new(0.0, 0.0, f64::NAN, 1.0)));
        assert!(!is_valid_rect(Rect::new(5.0, 0.0, 1.0, 1.0)));
    }
}
