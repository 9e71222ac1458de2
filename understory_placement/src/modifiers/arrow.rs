// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point an arrow element inside the popper at the reference.

use kurbo::Point;

use crate::geometry::within;
use crate::modifier::{ModifierDescriptor, Phase};
use crate::platform::measure_checked;
use crate::state::ModifierData;
use crate::types::{Axis, ElementId, Padding};

use super::names;

/// Options for [`arrow`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ArrowOptions {
    /// The arrow element; when `None`, the arrow in the instance's elements is used.
    pub element: Option<ElementId>,
    /// Keeps the arrow away from the popper's edges (for rounded corners).
    pub padding: Padding,
}

/// Arrow position written by [`arrow`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArrowData {
    /// Axis the arrow slides along (the popper's alignment axis).
    pub axis: Axis,
    /// Arrow origin along `axis`, relative to the popper.
    pub offset: f64,
    /// How far `offset` was pushed away from the ideal position by padding; zero when the
    /// arrow points straight at the target.
    pub center_offset: f64,
}

/// Positions the arrow along the popper edge facing the reference.
///
/// The arrow aims at the middle of the stretch where the reference and popper overlap, or at
/// the reference center when they do not overlap, and is kept inside the padded popper edge.
pub fn arrow(options: ArrowOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::ARROW, Phase::Main)
        .with_requires(&[names::POPPER_OFFSETS])
        .with_requires_if_exists(&[names::PREVENT_OVERFLOW])
        .with_effect(move |state, _args| {
            if let Some(element) = options.element {
                state.elements.arrow = Some(element);
            }
            None
        })
        .with_run(move |state, args| {
            let (Some(element), Some(popper)) = (state.elements.arrow, state.popper_rect()) else {
                return Ok(());
            };
            let arrow_rect = measure_checked(args.measure, element, state.strategy)?;
            let axis = state.placement.cross_axis();
            let reference = state.rects.reference;

            let start = axis.start_of(reference).max(axis.start_of(popper));
            let end = axis.end_of(reference).min(axis.end_of(popper));
            let target = if start <= end {
                (start + end) / 2.0
            } else {
                axis.start_of(reference) + axis.extent(reference) / 2.0
            };

            let arrow_len = axis.extent(arrow_rect);
            let ideal = target - axis.start_of(popper) - arrow_len / 2.0;
            let min = options.padding.get(axis.start_side());
            let max = axis.extent(popper) - arrow_len - options.padding.get(axis.end_side());
            let offset = within(min, ideal, max);

            let mut origin = Point::ZERO;
            axis.set_point(&mut origin, offset);
            state.offsets.arrow = Some(origin);
            state.modifiers_data.insert(
                args.name,
                ModifierData::Arrow(ArrowData {
                    axis,
                    offset,
                    center_offset: offset - ideal,
                }),
            );
            Ok(())
        })
}
