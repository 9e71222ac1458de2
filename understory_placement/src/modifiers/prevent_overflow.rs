// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keep the popper inside its clipping area by sliding it.
//!
//! Along each checked axis the popper may move within `[lo, hi]`, where
//! `lo = value + overflow(start edge)` and `hi = value - overflow(end edge)`. When both edges
//! overflow (`lo > hi`) the popper is centered between them.
//!
//! With `tether` on, the popper never slides so far that it detaches from the reference:
//!
//! - along the alignment axis it keeps at least `arrow length + tether_offset` of overlap;
//! - along the axis perpendicular to the side, the bound on the reference's side is replaced by
//!   the position where the popper still touches the reference, and that bound wins a conflict.

use kurbo::{Rect, Vec2};

use crate::geometry::{clamp_or_midpoint, within};
use crate::modifier::{ModifierDescriptor, Phase};
use crate::overflow::{Boundary, DetectOverflowOptions, RootBoundary, detect_overflow};
use crate::platform::measure_checked;
use crate::state::ModifierData;
use crate::types::{Axis, Padding, SideObject};

use super::names;

/// Options for [`prevent_overflow`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreventOverflowOptions {
    /// Slide along the alignment axis.
    pub cross_axis: bool,
    /// Slide along the axis perpendicular to the side.
    pub main_axis: bool,
    /// Virtual padding around the clipping area.
    pub padding: Padding,
    /// Clipping area.
    pub boundary: Boundary,
    /// Outermost clipping area.
    pub root_boundary: RootBoundary,
    /// Check against the reference's clipping parents.
    pub alt_boundary: bool,
    /// Keep the popper attached to the reference.
    pub tether: bool,
    /// Extra overlap the tether keeps.
    pub tether_offset: f64,
}

impl Default for PreventOverflowOptions {
    fn default() -> Self {
        Self {
            cross_axis: true,
            main_axis: false,
            padding: Padding::ZERO,
            boundary: Boundary::default(),
            root_boundary: RootBoundary::default(),
            alt_boundary: false,
            tether: true,
            tether_offset: 0.0,
        }
    }
}

fn overflow_bounds(value: f64, axis: Axis, overflow: &SideObject) -> (f64, f64) {
    (
        value + overflow.get(axis.start_side()),
        value - overflow.get(axis.end_side()),
    )
}

/// New position along the alignment axis.
fn slide_cross(
    value: f64,
    axis: Axis,
    overflow: &SideObject,
    reference: Rect,
    popper_len: f64,
    arrow_len: f64,
    options: &PreventOverflowOptions,
) -> f64 {
    let (mut lo, mut hi) = overflow_bounds(value, axis, overflow);
    if options.tether {
        let keep = arrow_len + options.tether_offset;
        lo = lo.min(axis.end_of(reference) - keep);
        hi = hi.max(axis.start_of(reference) - popper_len + keep);
    }
    clamp_or_midpoint(lo, value, hi)
}

/// New position along the axis perpendicular to the side.
fn slide_main(
    value: f64,
    axis: Axis,
    origin_side: bool,
    overflow: &SideObject,
    reference: Rect,
    popper_len: f64,
    options: &PreventOverflowOptions,
) -> f64 {
    let (lo, hi) = overflow_bounds(value, axis, overflow);
    if !options.tether {
        return clamp_or_midpoint(lo, value, hi);
    }
    if origin_side {
        // Above or left of the reference: never slide past its far edge.
        let hi = axis.end_of(reference) - options.tether_offset;
        value.max(lo).min(hi)
    } else {
        let lo = axis.start_of(reference) - popper_len + options.tether_offset;
        within(lo, value, hi)
    }
}

/// Slides the working popper offset back inside the clipping area. See the [module docs](self).
pub fn prevent_overflow(options: PreventOverflowOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::PREVENT_OVERFLOW, Phase::Main)
        .with_requires_if_exists(&[names::OFFSET])
        .with_run(move |state, args| {
            let Some(origin) = state.offsets.popper else {
                return Ok(());
            };
            let overflow = detect_overflow(
                state,
                args.measure,
                &DetectOverflowOptions {
                    boundary: options.boundary,
                    root_boundary: options.root_boundary,
                    alt_boundary: options.alt_boundary,
                    padding: options.padding,
                    ..DetectOverflowOptions::default()
                },
            )?;
            let placement = state.placement;
            let reference = state.rects.reference;
            let popper_size = state.rects.popper.size();
            let mut moved = origin;

            if options.cross_axis {
                let axis = placement.cross_axis();
                let arrow_len = match state.elements.arrow {
                    Some(arrow) => {
                        let rect = measure_checked(args.measure, arrow, state.strategy)?;
                        within(0.0, axis.extent(rect), axis.extent(reference))
                    }
                    None => 0.0,
                };
                let value = axis.of_point(origin);
                let slid = slide_cross(
                    value,
                    axis,
                    &overflow,
                    reference,
                    axis.of_size(popper_size),
                    arrow_len,
                    &options,
                );
                axis.set_point(&mut moved, slid);
            }
            if options.main_axis {
                let axis = placement.main_axis();
                let value = axis.of_point(origin);
                let slid = slide_main(
                    value,
                    axis,
                    placement.side().is_origin(),
                    &overflow,
                    reference,
                    axis.of_size(popper_size),
                    &options,
                );
                axis.set_point(&mut moved, slid);
            }

            let delta: Vec2 = moved - origin;
            state.offsets.popper = Some(moved);
            state
                .modifiers_data
                .insert(args.name, ModifierData::PreventOverflow(delta));
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    use crate::geometry::{compute_offsets, rect_from_xywh};
    use crate::headless::Scene;
    use crate::modifiers::testing;
    use crate::state::State;
    use crate::types::{ElementId, Placement};

    fn placed(reference: Rect, popper: Rect, placement: Placement) -> State {
        let mut state = testing::state(reference, popper, placement);
        state.offsets.popper = Some(compute_offsets(reference, popper.size(), placement));
        state
    }

    #[test]
    fn slides_back_by_exactly_the_overflow() {
        // Bottom-start popper 100 wide at x = 115 in a 200 wide viewport: 15 past the right edge.
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 200.0));
        let mut state = placed(
            rect_from_xywh(115.0, 10.0, 60.0, 20.0),
            rect_from_xywh(0.0, 0.0, 100.0, 30.0),
            Placement::BOTTOM_START,
        );
        testing::run(
            &prevent_overflow(PreventOverflowOptions::default()),
            &mut state,
            &*scene,
        )
        .unwrap();
        assert_eq!(state.offsets.popper, Some(Point::new(100.0, 30.0)));
        assert_eq!(
            state.modifiers_data.prevent_overflow(),
            Some(Vec2::new(-15.0, 0.0))
        );
    }

    #[test]
    fn centers_when_both_edges_overflow() {
        // A 260 wide popper cannot fit in 200; it is centered on the viewport.
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 200.0));
        let mut state = placed(
            rect_from_xywh(20.0, 10.0, 40.0, 20.0),
            rect_from_xywh(0.0, 0.0, 260.0, 30.0),
            Placement::BOTTOM_START,
        );
        testing::run(
            &prevent_overflow(PreventOverflowOptions {
                tether: false,
                ..PreventOverflowOptions::default()
            }),
            &mut state,
            &*scene,
        )
        .unwrap();
        assert_eq!(state.offsets.popper, Some(Point::new(-30.0, 30.0)));
    }

    #[test]
    fn tether_keeps_the_popper_attached() {
        // Reference partly scrolled out on the left; the popper slides fully back in.
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 200.0));
        let reference = rect_from_xywh(-50.0, 10.0, 60.0, 20.0);
        let popper = rect_from_xywh(0.0, 0.0, 100.0, 30.0);
        let mut state = placed(reference, popper, Placement::BOTTOM_END);
        // Origin x = 10 - 100 = -90.
        testing::run(
            &prevent_overflow(PreventOverflowOptions::default()),
            &mut state,
            &*scene,
        )
        .unwrap();
        assert_eq!(state.offsets.popper.map(|p| p.x), Some(0.0));

        let mut state = placed(
            rect_from_xywh(-150.0, 10.0, 60.0, 20.0),
            popper,
            Placement::BOTTOM_END,
        );
        testing::run(
            &prevent_overflow(PreventOverflowOptions::default()),
            &mut state,
            &*scene,
        )
        .unwrap();
        assert_eq!(
            state.offsets.popper.map(|p| p.x),
            Some(-90.0),
            "stops where it would detach"
        );
    }

    #[test]
    fn arrow_length_shrinks_the_tether() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 200.0));
        scene.set_rect(ElementId(9), rect_from_xywh(0.0, 0.0, 8.0, 8.0));
        let mut state = placed(
            rect_from_xywh(-150.0, 10.0, 60.0, 20.0),
            rect_from_xywh(0.0, 0.0, 100.0, 30.0),
            Placement::BOTTOM_END,
        );
        state.elements.arrow = Some(ElementId(9));
        testing::run(
            &prevent_overflow(PreventOverflowOptions::default()),
            &mut state,
            &*scene,
        )
        .unwrap();
        assert_eq!(state.offsets.popper.map(|p| p.x), Some(-98.0));
    }

    #[test]
    fn main_axis_slides_toward_the_reference_but_not_past_it() {
        // Bottom popper 30 tall under a reference at y = 150..170 in a 180 tall viewport.
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 180.0));
        let options = PreventOverflowOptions {
            main_axis: true,
            ..PreventOverflowOptions::default()
        };
        let mut state = placed(
            rect_from_xywh(50.0, 150.0, 60.0, 20.0),
            rect_from_xywh(0.0, 0.0, 60.0, 30.0),
            Placement::BOTTOM,
        );
        testing::run(&prevent_overflow(options), &mut state, &*scene).unwrap();
        assert_eq!(state.offsets.popper.map(|p| p.y), Some(150.0));

        // Sliding over the reference is allowed.
        let mut state = placed(
            rect_from_xywh(50.0, 175.0, 60.0, 20.0),
            rect_from_xywh(0.0, 0.0, 60.0, 30.0),
            Placement::BOTTOM,
        );
        testing::run(&prevent_overflow(options), &mut state, &*scene).unwrap();
        assert_eq!(state.offsets.popper.map(|p| p.y), Some(150.0));

        // Sliding past it is not: the popper's bottom stops at the reference's top.
        let mut state = placed(
            rect_from_xywh(50.0, 185.0, 60.0, 20.0),
            rect_from_xywh(0.0, 0.0, 60.0, 30.0),
            Placement::BOTTOM,
        );
        testing::run(&prevent_overflow(options), &mut state, &*scene).unwrap();
        assert_eq!(state.offsets.popper.map(|p| p.y), Some(155.0));
    }
}
