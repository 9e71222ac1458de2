// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displace the popper away from (or along) the reference.
//!
//! The displacement is given in placement-relative terms:
//!
//! - `main_axis` is the distance between reference and popper. Positive values push the
//!   popper away from the reference whichever side it is on.
//! - `cross_axis` is the skidding along the reference edge, towards the right or bottom.
//!
//! The displacement is computed for all twelve placements so that overflow detection can
//! predict where the popper would land at any candidate placement.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::fmt;

use kurbo::Vec2;

use crate::modifier::{ModifierDescriptor, Phase};
use crate::state::{ModifierData, StateRects};
use crate::types::{Axis, Placement};

use super::names;

/// Placement-relative displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Displacement {
    /// Distance from the reference.
    pub main_axis: f64,
    /// Skidding along the reference edge.
    pub cross_axis: f64,
}

/// Computes a displacement from the placement and the measured rects.
pub type OffsetFn = Rc<dyn Fn(Placement, &StateRects) -> Displacement>;

/// How the displacement is obtained.
#[derive(Clone)]
pub enum OffsetSpec {
    /// The same displacement for every placement.
    Fixed(Displacement),
    /// Computed per placement on every pass.
    Dynamic(OffsetFn),
}

impl Default for OffsetSpec {
    fn default() -> Self {
        Self::Fixed(Displacement::default())
    }
}

impl fmt::Debug for OffsetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl OffsetSpec {
    /// Displacement for `placement`, converted to a screen-space vector.
    pub fn to_vec(&self, placement: Placement, rects: &StateRects) -> Vec2 {
        let d = match self {
            Self::Fixed(d) => *d,
            Self::Dynamic(f) => f(placement, rects),
        };
        let side = placement.side();
        let distance = if side.is_origin() {
            -d.main_axis
        } else {
            d.main_axis
        };
        match side.axis() {
            Axis::X => Vec2::new(distance, d.cross_axis),
            Axis::Y => Vec2::new(d.cross_axis, distance),
        }
    }
}

/// Options for [`offset`].
#[derive(Clone, Debug, Default)]
pub struct OffsetOptions {
    /// The displacement.
    pub offset: OffsetSpec,
}

/// Screen-space displacement for each of the twelve placements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OffsetData {
    table: BTreeMap<Placement, Vec2>,
}

impl OffsetData {
    /// Evaluate `spec` for every placement.
    pub fn compute(spec: &OffsetSpec, rects: &StateRects) -> Self {
        Self {
            table: Placement::ALL
                .iter()
                .map(|&p| (p, spec.to_vec(p, rects)))
                .collect(),
        }
    }

    /// Displacement at `placement`; zero if it was never computed.
    pub fn get(&self, placement: Placement) -> Vec2 {
        self.table.get(&placement).copied().unwrap_or(Vec2::ZERO)
    }
}

/// Moves the working popper offset by the displacement of the current placement.
pub fn offset(options: OffsetOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::OFFSET, Phase::Main)
        .with_requires(&[names::POPPER_OFFSETS])
        .with_run(move |state, args| {
            let table = OffsetData::compute(&options.offset, &state.rects);
            let shift = table.get(state.placement);
            if let Some(origin) = state.offsets.popper.as_mut() {
                *origin += shift;
            }
            state
                .modifiers_data
                .insert(args.name, ModifierData::Offset(table));
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    use crate::geometry::rect_from_xywh;
    use crate::headless::Scene;
    use crate::modifiers::testing;

    fn fixed(main_axis: f64, cross_axis: f64) -> OffsetSpec {
        OffsetSpec::Fixed(Displacement {
            main_axis,
            cross_axis,
        })
    }

    #[test]
    fn distance_points_away_from_the_reference() {
        let rects = StateRects::default();
        let spec = fixed(10.0, 3.0);
        assert_eq!(spec.to_vec(Placement::BOTTOM, &rects), Vec2::new(3.0, 10.0));
        assert_eq!(spec.to_vec(Placement::TOP_START, &rects), Vec2::new(3.0, -10.0));
        assert_eq!(spec.to_vec(Placement::RIGHT, &rects), Vec2::new(10.0, 3.0));
        assert_eq!(spec.to_vec(Placement::LEFT_END, &rects), Vec2::new(-10.0, 3.0));
    }

    #[test]
    fn dynamic_offsets_see_placement_and_rects() {
        let spec = OffsetSpec::Dynamic(Rc::new(|placement: Placement, rects: &StateRects| {
            Displacement {
                main_axis: if placement.alignment().is_some() {
                    rects.popper.height()
                } else {
                    0.0
                },
                cross_axis: 0.0,
            }
        }));
        let rects = StateRects {
            reference: rect_from_xywh(0.0, 0.0, 10.0, 10.0),
            popper: rect_from_xywh(0.0, 0.0, 4.0, 6.0),
        };
        let table = OffsetData::compute(&spec, &rects);
        assert_eq!(table.get(Placement::BOTTOM), Vec2::ZERO);
        assert_eq!(table.get(Placement::BOTTOM_END), Vec2::new(0.0, 6.0));
        assert_eq!(table.get(Placement::LEFT_START), Vec2::new(-6.0, 0.0));
    }

    #[test]
    fn run_moves_the_popper_and_records_every_placement() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 500.0, 500.0));
        let mut state = testing::state(
            rect_from_xywh(100.0, 100.0, 100.0, 20.0),
            rect_from_xywh(0.0, 0.0, 50.0, 10.0),
            Placement::TOP,
        );
        state.offsets.popper = Some(Point::new(125.0, 90.0));
        testing::run(&offset(OffsetOptions { offset: fixed(8.0, 0.0) }), &mut state, &*scene)
            .unwrap();
        assert_eq!(state.offsets.popper, Some(Point::new(125.0, 82.0)));
        let data = state.modifiers_data.offset().unwrap();
        assert_eq!(data.get(Placement::RIGHT), Vec2::new(8.0, 0.0));
    }
}
