// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Base popper position for the current placement.

use crate::geometry::compute_offsets;
use crate::modifier::{ModifierDescriptor, Phase};
use crate::state::ModifierData;

use super::names;

/// Seeds [`State::offsets`](crate::state::State::offsets) with the popper origin implied by
/// the current placement alone. Every other positioning modifier refines this value.
pub fn popper_offsets() -> ModifierDescriptor {
    ModifierDescriptor::new(names::POPPER_OFFSETS, Phase::Read).with_run(|state, args| {
        let origin = compute_offsets(
            state.rects.reference,
            state.rects.popper.size(),
            state.placement,
        );
        state.offsets.popper = Some(origin);
        state
            .modifiers_data
            .insert(args.name, ModifierData::PopperOffsets(origin));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Point;

    use crate::geometry::rect_from_xywh;
    use crate::headless::Scene;
    use crate::modifier::ModifierArgs;
    use crate::state::{Options, State};
    use crate::types::{ElementId, Elements, Placement};

    #[test]
    fn follows_the_current_placement() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 500.0, 500.0));
        let mut state = State::new(
            Elements::new(ElementId(1), ElementId(2)),
            Options::bare(),
            vec![],
        );
        state.rects.reference = rect_from_xywh(100.0, 100.0, 100.0, 20.0);
        state.rects.popper = rect_from_xywh(0.0, 0.0, 50.0, 10.0);
        state.placement = Placement::RIGHT_END;

        let m = popper_offsets();
        let args = ModifierArgs {
            name: m.name,
            measure: &*scene,
            writer: None,
        };
        (m.run.as_ref().unwrap())(&mut state, &args).unwrap();
        assert_eq!(state.offsets.popper, Some(Point::new(200.0, 110.0)));
        assert_eq!(
            state.modifiers_data.popper_offsets(),
            Some(Point::new(200.0, 110.0))
        );
    }
}
