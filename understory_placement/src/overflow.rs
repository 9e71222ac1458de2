// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overflow detection against clipping boundaries.
//!
//! ## Overview
//!
//! [`detect_overflow`] answers "by how much does this element stick out of the area it may
//! be shown in?" for one edge at a time. The area (the *clipping rect*) is the intersection
//! of a [`Boundary`] and a [`RootBoundary`]:
//!
//! - [`Boundary::ClippingParents`] intersects every scroll ancestor whose computed
//!   `overflow` is not `visible`.
//! - [`RootBoundary::Viewport`] is the visible viewport; [`RootBoundary::Document`] is the
//!   whole scrollable document.
//!
//! For the popper, the element rect is where the popper *would* be at the requested
//! placement (base position plus the `offset` modifier's displacement for that placement),
//! not its working position. That lets `flip` test candidates without moving anything.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::error::MeasureError;
use crate::geometry::{compute_offsets, intersect_clip, overflow};
use crate::platform::{Measure, measure_checked};
use crate::state::State;
use crate::types::{Axis, ElementId, Padding, Placement, ScrollTarget, Side, SideObject, Strategy};

/// Area the element should stay inside, before the root boundary is applied.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Boundary {
    /// Every clipping scroll ancestor of the element.
    #[default]
    ClippingParents,
    /// The layout box of one element.
    Element(ElementId),
    /// A fixed rect in the pass' coordinate space.
    Rect(Rect),
}

/// Outermost clipping area.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum RootBoundary {
    /// The visible viewport.
    #[default]
    Viewport,
    /// The whole scrollable document.
    Document,
}

/// Which element's overflow is measured.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ElementContext {
    /// The floating element, at the requested placement.
    #[default]
    Popper,
    /// The reference element.
    Reference,
}

impl ElementContext {
    /// The other element.
    pub const fn alt(self) -> Self {
        match self {
            Self::Popper => Self::Reference,
            Self::Reference => Self::Popper,
        }
    }
}

/// Options for [`detect_overflow`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DetectOverflowOptions {
    /// Placement the popper is tested at; `None` uses the state's current placement.
    pub placement: Option<Placement>,
    /// Clipping area.
    pub boundary: Boundary,
    /// Outermost clipping area.
    pub root_boundary: RootBoundary,
    /// Element whose overflow is measured.
    pub element_context: ElementContext,
    /// Use the clipping parents of the *other* element.
    pub alt_boundary: bool,
    /// Virtual padding added to every edge's overflow.
    pub padding: Padding,
}

/// The clipping rect for an element whose scroll ancestors are `scroll_parents`.
pub fn clipping_rect(
    measure: &dyn Measure,
    scroll_parents: &[ScrollTarget],
    boundary: Boundary,
    root_boundary: RootBoundary,
    strategy: Strategy,
) -> Result<Rect, MeasureError> {
    let root = match root_boundary {
        RootBoundary::Viewport => measure.viewport_rect(strategy),
        RootBoundary::Document => measure.document_rect(),
    };
    let mut clip = root;
    match boundary {
        Boundary::ClippingParents => {
            for parent in clipping_parents(measure, scroll_parents) {
                clip = intersect_clip(clip, measure_checked(measure, parent, strategy)?);
            }
        }
        Boundary::Element(element) => {
            clip = intersect_clip(clip, measure_checked(measure, element, strategy)?);
        }
        Boundary::Rect(rect) => clip = intersect_clip(clip, rect),
    }
    Ok(clip)
}

/// Scroll ancestors that actually clip their content.
fn clipping_parents(measure: &dyn Measure, scroll_parents: &[ScrollTarget]) -> Vec<ElementId> {
    scroll_parents
        .iter()
        .filter_map(|target| match *target {
            ScrollTarget::Element(id) => Some(id),
            ScrollTarget::Viewport => None,
        })
        .filter(|&id| {
            measure
                .computed_style(id)
                .get("overflow")
                .is_none_or(|value| value != "visible")
        })
        .collect()
}

/// Signed per-edge overflow of the context element past its clipping rect, plus padding.
///
/// Positive means the element sticks out past that edge. See the [module docs](self).
pub fn detect_overflow(
    state: &State,
    measure: &dyn Measure,
    options: &DetectOverflowOptions,
) -> Result<SideObject, MeasureError> {
    let placement = options.placement.unwrap_or(state.placement);
    let context = options.element_context;
    let clip_context = if options.alt_boundary {
        context.alt()
    } else {
        context
    };
    let scroll_parents = match clip_context {
        ElementContext::Popper => &state.scroll_parents.popper,
        ElementContext::Reference => &state.scroll_parents.reference,
    };
    let clip = clipping_rect(
        measure,
        scroll_parents,
        options.boundary,
        options.root_boundary,
        state.strategy,
    )?;

    let element_rect = match context {
        ElementContext::Reference => state.rects.reference,
        ElementContext::Popper => {
            let size = state.rects.popper.size();
            Rect::from_origin_size(compute_offsets(state.rects.reference, size, placement), size)
        }
    };

    let mut out = overflow(element_rect, clip);
    for side in Side::ALL {
        *out.get_mut(side) += options.padding.get(side);
    }

    if context == ElementContext::Popper {
        if let Some(offset) = state.modifiers_data.offset() {
            let shift = offset.get(placement);
            for side in Side::ALL {
                let along = match side.axis() {
                    Axis::Y => shift.y,
                    Axis::X => shift.x,
                };
                let sign = if side.is_origin() { -1.0 } else { 1.0 };
                *out.get_mut(side) += along * sign;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;

    use crate::geometry::rect_from_xywh;
    use crate::headless::Scene;
    use crate::modifiers::names;
    use crate::modifiers::offset::{Displacement, OffsetData, OffsetSpec};
    use crate::state::{ModifierData, Options};
    use crate::types::Elements;

    const REFERENCE: ElementId = ElementId(1);
    const POPPER: ElementId = ElementId(2);
    const PANEL: ElementId = ElementId(3);

    fn setup() -> (Rc<Scene>, State) {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 200.0));
        scene.set_rect(REFERENCE, rect_from_xywh(50.0, 150.0, 100.0, 20.0));
        scene.set_rect(POPPER, rect_from_xywh(0.0, 0.0, 60.0, 40.0));
        let mut state = State::new(Elements::new(REFERENCE, POPPER), Options::bare(), vec![]);
        state.rects.reference = rect_from_xywh(50.0, 150.0, 100.0, 20.0);
        state.rects.popper = rect_from_xywh(0.0, 0.0, 60.0, 40.0);
        (scene, state)
    }

    #[test]
    fn popper_overflow_uses_the_requested_placement() {
        let (scene, state) = setup();
        let below = detect_overflow(&state, &*scene, &DetectOverflowOptions::default()).unwrap();
        // Popper at y = 170..210 in a 200 tall viewport.
        assert_eq!(below.bottom, 10.0);
        assert_eq!(below.top, -170.0);

        let above = detect_overflow(
            &state,
            &*scene,
            &DetectOverflowOptions {
                placement: Some(Placement::TOP),
                ..DetectOverflowOptions::default()
            },
        )
        .unwrap();
        assert_eq!(above.top, -110.0);
    }

    #[test]
    fn padding_and_offset_displacement_are_added() {
        let (scene, mut state) = setup();
        let table = OffsetData::compute(
            &OffsetSpec::Fixed(Displacement {
                main_axis: 5.0,
                cross_axis: 0.0,
            }),
            &state.rects,
        );
        state
            .modifiers_data
            .insert(names::OFFSET, ModifierData::Offset(table));
        let o = detect_overflow(
            &state,
            &*scene,
            &DetectOverflowOptions {
                padding: 2.0.into(),
                ..DetectOverflowOptions::default()
            },
        )
        .unwrap();
        assert_eq!(o.bottom, 10.0 + 2.0 + 5.0);
        assert_eq!(o.top, -170.0 + 2.0 - 5.0);
    }

    #[test]
    fn visible_parents_do_not_clip() {
        let (scene, mut state) = setup();
        scene.set_rect(PANEL, rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        state.scroll_parents.popper = vec![ScrollTarget::Element(PANEL), ScrollTarget::Viewport];

        let clipped = detect_overflow(&state, &*scene, &DetectOverflowOptions::default()).unwrap();
        assert_eq!(clipped.bottom, 110.0);

        scene.set_computed_style(PANEL, "overflow", "visible");
        let unclipped =
            detect_overflow(&state, &*scene, &DetectOverflowOptions::default()).unwrap();
        assert_eq!(unclipped.bottom, 10.0);
    }

    #[test]
    fn alt_boundary_switches_clipping_parents() {
        let (scene, mut state) = setup();
        scene.set_rect(PANEL, rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        state.scroll_parents.reference = vec![ScrollTarget::Element(PANEL)];
        let own = detect_overflow(&state, &*scene, &DetectOverflowOptions::default()).unwrap();
        let alt = detect_overflow(
            &state,
            &*scene,
            &DetectOverflowOptions {
                alt_boundary: true,
                ..DetectOverflowOptions::default()
            },
        )
        .unwrap();
        assert_eq!(own.bottom, 10.0);
        assert_eq!(alt.bottom, 110.0);
    }

    #[test]
    fn reference_context_and_explicit_boundaries() {
        let (scene, state) = setup();
        let o = detect_overflow(
            &state,
            &*scene,
            &DetectOverflowOptions {
                element_context: ElementContext::Reference,
                boundary: Boundary::Rect(rect_from_xywh(0.0, 0.0, 120.0, 200.0)),
                ..DetectOverflowOptions::default()
            },
        )
        .unwrap();
        assert_eq!(o.right, 30.0);

        let missing = detect_overflow(
            &state,
            &*scene,
            &DetectOverflowOptions {
                boundary: Boundary::Element(ElementId(99)),
                ..DetectOverflowOptions::default()
            },
        );
        assert_eq!(
            missing,
            Err(MeasureError::Unavailable {
                element: ElementId(99)
            })
        );
    }
}
