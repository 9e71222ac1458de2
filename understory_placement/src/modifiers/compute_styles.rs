// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turn working offsets into renderer-agnostic styles.

use alloc::string::ToString;

use kurbo::Vec2;

use crate::modifier::{ModifierDescriptor, Phase};
use crate::state::{AttributeValue, Style, Transform};
use crate::types::{Axis, Strategy, Target};

use super::names;

/// Attribute carrying the final placement label.
pub const PLACEMENT_ATTRIBUTE: &str = "data-popper-placement";

/// Options for [`compute_styles`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComputeStylesOptions {
    /// Position through a transform instead of `left`/`top`.
    pub gpu_acceleration: bool,
    /// Snap offsets to the device pixel grid.
    pub round_offsets: bool,
}

impl Default for ComputeStylesOptions {
    fn default() -> Self {
        Self {
            gpu_acceleration: true,
            round_offsets: true,
        }
    }
}

/// Round `v` to the nearest device pixel.
pub fn round_by_dpr(v: Vec2, dpr: f64) -> Vec2 {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    (v * dpr).round() / dpr
}

/// Writes the popper and arrow styles and the placement attribute.
pub fn compute_styles(options: ComputeStylesOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::COMPUTE_STYLES, Phase::BeforeWrite).with_run(
        move |state, args| {
            let Some(origin) = state.offsets.popper else {
                return Ok(());
            };
            let dpr = args.measure.device_pixel_ratio();
            let round = |v: Vec2| {
                if options.round_offsets {
                    round_by_dpr(v, dpr)
                } else {
                    v
                }
            };
            let at = round(origin.to_vec2());

            let mut popper = Style {
                position: Some(state.strategy),
                ..Style::default()
            };
            if options.gpu_acceleration {
                popper.left = Some(0.0);
                popper.top = Some(0.0);
                popper.transform = Some(if dpr <= 1.0 {
                    Transform::Translate(at)
                } else {
                    Transform::Translate3d(at)
                });
            } else {
                popper.left = Some(at.x);
                popper.top = Some(at.y);
            }
            state.styles.insert(Target::Popper, popper);

            if let Some(arrow) = state.modifiers_data.arrow().copied() {
                let along = round(arrow.axis.vec(arrow.offset));
                let mut style = Style {
                    position: Some(Strategy::Absolute),
                    ..Style::default()
                };
                match arrow.axis {
                    Axis::X => style.left = Some(along.x),
                    Axis::Y => style.top = Some(along.y),
                }
                state.styles.insert(Target::Arrow, style);
            }

            state.attributes.entry(Target::Popper).or_default().insert(
                PLACEMENT_ATTRIBUTE,
                AttributeValue::Text(state.placement.to_string()),
            );
            Ok(())
        },
    )
}
