// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Report when the reference is clipped away or the popper has escaped its clipping area.

use kurbo::Vec2;

use crate::geometry::side_offsets;
use crate::modifier::{ModifierDescriptor, Phase};
use crate::overflow::{DetectOverflowOptions, ElementContext, detect_overflow};
use crate::state::{AttributeValue, ModifierData};
use crate::types::{SideObject, Target};

use super::names;

/// Attribute set on the popper while the reference is fully clipped.
pub const REFERENCE_HIDDEN_ATTRIBUTE: &str = "data-popper-reference-hidden";
/// Attribute set on the popper while it lies outside the reference's clipping area.
pub const ESCAPED_ATTRIBUTE: &str = "data-popper-escaped";

/// Options for [`hide`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HideOptions {
    /// Skip writing the two attributes; the data slot is still filled.
    pub skip_attributes: bool,
}

/// Visibility report written by [`hide`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HideData {
    /// Per edge, how far past fully clipped the reference is; `>= 0` means clipped on that edge.
    pub reference_clipping_offsets: SideObject,
    /// Per edge, how far past the reference's clipping area the popper is.
    pub popper_escape_offsets: SideObject,
    /// The reference is completely clipped by its own clipping area.
    pub is_reference_hidden: bool,
    /// The popper lies completely outside the reference's clipping area.
    pub has_popper_escaped: bool,
}

/// Computes [`HideData`] and mirrors it into popper attributes.
pub fn hide(options: HideOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::HIDE, Phase::Main)
        .with_requires_if_exists(&[names::PREVENT_OVERFLOW])
        .with_run(move |state, args| {
            let reference_overflow = detect_overflow(
                state,
                args.measure,
                &DetectOverflowOptions {
                    element_context: ElementContext::Reference,
                    ..DetectOverflowOptions::default()
                },
            )?;
            let popper_alt_overflow = detect_overflow(
                state,
                args.measure,
                &DetectOverflowOptions {
                    alt_boundary: true,
                    ..DetectOverflowOptions::default()
                },
            )?;
            let prevented = state
                .modifiers_data
                .prevent_overflow()
                .unwrap_or(Vec2::ZERO);

            let reference_clipping_offsets =
                side_offsets(reference_overflow, state.rects.reference, Vec2::ZERO);
            let popper_escape_offsets =
                side_offsets(popper_alt_overflow, state.rects.popper, prevented);
            let data = HideData {
                reference_clipping_offsets,
                popper_escape_offsets,
                is_reference_hidden: reference_clipping_offsets.any_non_negative(),
                has_popper_escaped: popper_escape_offsets.any_non_negative(),
            };

            if !options.skip_attributes {
                let attributes = state.attributes.entry(Target::Popper).or_default();
                attributes.insert(
                    REFERENCE_HIDDEN_ATTRIBUTE,
                    AttributeValue::Flag(data.is_reference_hidden),
                );
                attributes.insert(
                    ESCAPED_ATTRIBUTE,
                    AttributeValue::Flag(data.has_popper_escaped),
                );
            }
            state
                .modifiers_data
                .insert(args.name, ModifierData::Hide(data));
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    use crate::geometry::rect_from_xywh;
    use crate::headless::Scene;
    use crate::modifiers::testing;
    use crate::types::{ElementId, Placement, ScrollTarget};

    const PANEL: ElementId = ElementId(5);

    #[test]
    fn visible_reference_is_not_hidden() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 300.0, 300.0));
        let mut state = testing::state(
            rect_from_xywh(100.0, 100.0, 50.0, 20.0),
            rect_from_xywh(0.0, 0.0, 50.0, 20.0),
            Placement::BOTTOM,
        );
        testing::run(&hide(HideOptions::default()), &mut state, &*scene).unwrap();
        let data = state.modifiers_data.hide().copied().unwrap();
        assert!(!data.is_reference_hidden);
        assert!(!data.has_popper_escaped);
        assert_eq!(
            state.attributes[&Target::Popper][REFERENCE_HIDDEN_ATTRIBUTE],
            AttributeValue::Flag(false)
        );
    }

    #[test]
    fn reference_scrolled_out_of_its_panel_is_hidden() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 300.0, 300.0));
        scene.set_rect(PANEL, rect_from_xywh(0.0, 0.0, 300.0, 90.0));
        let mut state = testing::state(
            rect_from_xywh(100.0, 100.0, 50.0, 20.0),
            rect_from_xywh(0.0, 0.0, 50.0, 20.0),
            Placement::BOTTOM,
        );
        state.scroll_parents.reference = vec![ScrollTarget::Element(PANEL)];
        testing::run(&hide(HideOptions::default()), &mut state, &*scene).unwrap();
        let data = state.modifiers_data.hide().copied().unwrap();
        // Reference top is 10 below the panel's bottom edge.
        assert_eq!(data.reference_clipping_offsets.bottom, 10.0);
        assert!(data.is_reference_hidden);
        assert!(data.has_popper_escaped, "the popper sits even further below");
        assert_eq!(
            state.attributes[&Target::Popper][ESCAPED_ATTRIBUTE],
            AttributeValue::Flag(true)
        );
    }

    #[test]
    fn attributes_can_be_skipped() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 300.0, 300.0));
        let mut state = testing::state(
            rect_from_xywh(100.0, 100.0, 50.0, 20.0),
            rect_from_xywh(0.0, 0.0, 50.0, 20.0),
            Placement::BOTTOM,
        );
        let m = hide(HideOptions {
            skip_attributes: true,
        });
        testing::run(&m, &mut state, &*scene).unwrap();
        assert!(state.attributes.is_empty());
        assert!(state.modifiers_data.hide().is_some());
    }
}
