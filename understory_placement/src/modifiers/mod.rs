// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in modifiers.
//!
//! Each submodule exposes a constructor that captures its options and returns a
//! [`ModifierDescriptor`]:
//!
//! | Name               | Phase         | Depends on                                              |
//! |--------------------|---------------|---------------------------------------------------------|
//! | `popper_offsets`   | `Read`        |                                                         |
//! | `offset`           | `Main`        | `popper_offsets`                                        |
//! | `flip`             | `Main`        | `offset` if present                                     |
//! | `prevent_overflow` | `Main`        | `offset` if present                                     |
//! | `arrow`            | `Main`        | `popper_offsets`; `prevent_overflow` if present         |
//! | `hide`             | `Main`        | `prevent_overflow` if present                           |
//! | `compute_styles`   | `BeforeWrite` |                                                         |
//! | `apply_styles`     | `Write`       | `compute_styles`                                        |
//! | `event_listeners`  | `Write`       | (effect only)                                           |
//!
//! To change a built-in's options, append a freshly constructed descriptor to the modifier
//! list; it replaces the default one of the same name. To switch one off, append
//! [`ModifierDescriptor::disabled`].

use alloc::vec;
use alloc::vec::Vec;

use crate::modifier::ModifierDescriptor;

pub mod apply_styles;
pub mod arrow;
pub mod compute_styles;
pub mod event_listeners;
pub mod flip;
pub mod hide;
pub mod offset;
pub mod popper_offsets;
pub mod prevent_overflow;

/// Registered names of the built-in modifiers.
pub mod names {
    /// [`apply_styles`](super::apply_styles::apply_styles)
    pub const APPLY_STYLES: &str = "apply_styles";
    /// [`arrow`](super::arrow::arrow)
    pub const ARROW: &str = "arrow";
    /// [`compute_styles`](super::compute_styles::compute_styles)
    pub const COMPUTE_STYLES: &str = "compute_styles";
    /// [`event_listeners`](super::event_listeners::event_listeners)
    pub const EVENT_LISTENERS: &str = "event_listeners";
    /// [`flip`](super::flip::flip)
    pub const FLIP: &str = "flip";
    /// [`hide`](super::hide::hide)
    pub const HIDE: &str = "hide";
    /// [`offset`](super::offset::offset)
    pub const OFFSET: &str = "offset";
    /// [`popper_offsets`](super::popper_offsets::popper_offsets)
    pub const POPPER_OFFSETS: &str = "popper_offsets";
    /// [`prevent_overflow`](super::prevent_overflow::prevent_overflow)
    pub const PREVENT_OVERFLOW: &str = "prevent_overflow";
}

/// Every built-in modifier with default options.
pub fn default_modifiers() -> Vec<ModifierDescriptor> {
    vec![
        event_listeners::event_listeners(event_listeners::EventListenersOptions::default()),
        popper_offsets::popper_offsets(),
        compute_styles::compute_styles(compute_styles::ComputeStylesOptions::default()),
        apply_styles::apply_styles(),
        offset::offset(offset::OffsetOptions::default()),
        flip::flip(flip::FlipOptions::default()),
        prevent_overflow::prevent_overflow(prevent_overflow::PreventOverflowOptions::default()),
        arrow::arrow(arrow::ArrowOptions::default()),
        hide::hide(hide::HideOptions::default()),
    ]
}

/// Helpers for exercising one modifier outside an instance.
#[cfg(test)]
pub(crate) mod testing {
    use alloc::vec;
    use kurbo::Rect;

    use crate::error::MeasureError;
    use crate::modifier::{ModifierArgs, ModifierDescriptor};
    use crate::platform::Measure;
    use crate::state::{Options, State};
    use crate::types::{ElementId, Elements, Placement};

    pub(crate) const REFERENCE: ElementId = ElementId(1);
    pub(crate) const POPPER: ElementId = ElementId(2);

    /// A state with measured rects and no modifiers.
    pub(crate) fn state(reference: Rect, popper: Rect, placement: Placement) -> State {
        let mut state = State::new(
            Elements::new(REFERENCE, POPPER),
            Options::bare().with_placement(placement),
            vec![],
        );
        state.rects.reference = reference;
        state.rects.popper = popper;
        state
    }

    /// Run `modifier` once, as the orchestrator would.
    pub(crate) fn run(
        modifier: &ModifierDescriptor,
        state: &mut State,
        measure: &dyn Measure,
    ) -> Result<(), MeasureError> {
        if let Some(data) = &modifier.data {
            if state.modifiers_data.get(modifier.name).is_none() {
                state.modifiers_data.insert(modifier.name, data.clone());
            }
        }
        let Some(run) = &modifier.run else {
            return Ok(());
        };
        let args = ModifierArgs {
            name: modifier.name,
            measure,
            writer: None,
        };
        run(state, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::order_modifiers;

    #[test]
    fn defaults_resolve_in_pipeline_order() {
        let order = order_modifiers(&default_modifiers()).unwrap();
        let order: Vec<_> = order.iter().map(|m| m.name).collect();
        assert_eq!(
            order,
            [
                names::POPPER_OFFSETS,
                names::OFFSET,
                names::FLIP,
                names::PREVENT_OVERFLOW,
                names::ARROW,
                names::HIDE,
                names::COMPUTE_STYLES,
                names::EVENT_LISTENERS,
                names::APPLY_STYLES,
            ]
        );
    }
}
