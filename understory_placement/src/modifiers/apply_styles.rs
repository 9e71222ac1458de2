// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hand computed styles and attributes to the host's [`StyleWriter`](crate::platform::StyleWriter).
//!
//! This is the only built-in that writes outside the state. Without a writer on the
//! [`Platform`](crate::platform::Platform) it does nothing, and callers read
//! [`State::styles`](crate::state::State::styles) from the snapshot instead.

use crate::modifier::{ModifierDescriptor, Phase};
use crate::platform::Disposer;
use crate::state::{Attributes, Style};
use crate::types::{Strategy, Target};

use super::names;

/// The style a popper gets before its first pass: positioned at the origin, margins reset.
pub fn initial_popper_style(strategy: Strategy) -> Style {
    Style {
        position: Some(strategy),
        left: Some(0.0),
        top: Some(0.0),
        margin_reset: true,
        ..Style::default()
    }
}

/// Writes every target's style and attributes on each pass.
///
/// Its effect positions the popper at the origin right away so it does not flash at its
/// in-flow position, and its teardown clears everything it wrote.
pub fn apply_styles() -> ModifierDescriptor {
    ModifierDescriptor::new(names::APPLY_STYLES, Phase::Write)
        .with_requires(&[names::COMPUTE_STYLES])
        .with_run(|state, args| {
            let Some(writer) = args.writer else {
                return Ok(());
            };
            let empty_style = Style::default();
            let empty_attributes = Attributes::new();
            for target in [Target::Popper, Target::Arrow, Target::Reference] {
                let Some(element) = state.elements.get(target) else {
                    continue;
                };
                let style = state.styles.get(&target);
                let attributes = state.attributes.get(&target);
                if style.is_none() && attributes.is_none() {
                    continue;
                }
                writer.apply(
                    element,
                    style.unwrap_or(&empty_style),
                    attributes.unwrap_or(&empty_attributes),
                );
            }
            Ok(())
        })
        .with_effect(|state, args| {
            let writer = args.platform.writer.clone()?;
            let elements = state.elements;
            writer.apply(
                elements.popper,
                &initial_popper_style(state.options.strategy),
                &Attributes::new(),
            );
            if let Some(arrow) = elements.arrow {
                let style = Style {
                    position: Some(Strategy::Absolute),
                    ..Style::default()
                };
                writer.apply(arrow, &style, &Attributes::new());
            }
            Some(Disposer::new(move || {
                writer.clear(elements.popper);
                if let Some(arrow) = elements.arrow {
                    writer.clear(arrow);
                }
            }))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geometry::rect_from_xywh;
    use crate::headless::Scene;
    use crate::modifier::ModifierArgs;
    use crate::modifiers::testing;
    use crate::state::AttributeValue;
    use crate::types::Placement;

    #[test]
    fn writes_only_targets_with_output() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        let mut state = testing::state(
            rect_from_xywh(0.0, 0.0, 10.0, 10.0),
            rect_from_xywh(0.0, 0.0, 10.0, 10.0),
            Placement::BOTTOM,
        );
        state.styles.insert(
            Target::Popper,
            Style {
                left: Some(4.0),
                ..Style::default()
            },
        );
        state
            .attributes
            .entry(Target::Popper)
            .or_default()
            .insert("data-popper-placement", AttributeValue::Text("bottom".into()));

        let m = apply_styles();
        let args = ModifierArgs {
            name: m.name,
            measure: &*scene,
            writer: Some(&*scene),
        };
        (m.run.as_ref().unwrap())(&mut state, &args).unwrap();

        assert_eq!(scene.apply_count(), 1);
        assert_eq!(
            scene.applied_style(testing::POPPER).and_then(|s| s.left),
            Some(4.0)
        );
        assert!(scene.applied_style(testing::REFERENCE).is_none());
    }

    #[test]
    fn headless_run_is_a_no_op() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        let mut state = testing::state(
            rect_from_xywh(0.0, 0.0, 10.0, 10.0),
            rect_from_xywh(0.0, 0.0, 10.0, 10.0),
            Placement::BOTTOM,
        );
        state.styles.insert(Target::Popper, Style::default());
        testing::run(&apply_styles(), &mut state, &*scene).unwrap();
        assert_eq!(scene.apply_count(), 0);
    }
}
