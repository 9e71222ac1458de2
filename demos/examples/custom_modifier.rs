// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extending the pipeline with a custom modifier and disabling a built-in.
//!
//! Runs headless: nothing is written, the computed styles are read from the snapshot.
//!
//! Run:
//! - `cargo run -p understory_examples --example custom_modifier`

use std::rc::Rc;

use understory_placement::geometry::rect_from_xywh;
use understory_placement::headless::Scene;
use understory_placement::modifiers::names;
use understory_placement::state::ModifierData;
use understory_placement::types::Target;
use understory_placement::{
    ElementId, Elements, Instance, ModifierDescriptor, Options, OptionsUpdate, Phase, Placement,
    TaskQueue,
};

const ANCHOR: ElementId = ElementId(1);
const PANEL: ElementId = ElementId(2);

/// Snap the popper origin to an 8 unit grid after overflow handling.
fn snap_to_grid() -> ModifierDescriptor {
    ModifierDescriptor::new("snap_to_grid", Phase::AfterMain)
        .with_requires(&[names::POPPER_OFFSETS])
        .with_requires_if_exists(&[names::PREVENT_OVERFLOW])
        .with_run(|state, args| {
            if let Some(origin) = state.offsets.popper.as_mut() {
                let before = *origin;
                origin.x = (origin.x / 8.0).round() * 8.0;
                origin.y = (origin.y / 8.0).round() * 8.0;
                let moved = *origin - before;
                state
                    .modifiers_data
                    .insert(args.name, ModifierData::Custom(Rc::new(moved)));
            }
            Ok(())
        })
}

fn main() {
    let scene = Scene::new(rect_from_xywh(0.0, 0.0, 640.0, 480.0));
    scene.set_rect(ANCHOR, rect_from_xywh(101.0, 203.0, 30.0, 30.0));
    scene.set_rect(PANEL, rect_from_xywh(0.0, 0.0, 90.0, 50.0));

    let options = Options::default()
        .with_placement(Placement::RIGHT_START)
        .with_modifier(snap_to_grid())
        // Later entries replace earlier ones by name.
        .with_modifier(ModifierDescriptor::disabled(names::FLIP));
    let instance = Instance::new(
        Elements::new(ANCHOR, PANEL),
        options,
        scene.headless_platform(),
        TaskQueue::new(),
    )
    .expect("modifiers resolve");

    let state = instance.force_update().expect("measured");
    let order: Vec<_> = state.ordered_modifiers.iter().map(|m| m.name).collect();
    println!("== Order ==\n  {order:?}");
    println!("== Right start ==");
    println!("  popper rect: {:?}", state.popper_rect());
    println!("  style: {:?}", state.styles.get(&Target::Popper));
    println!(
        "  snapped by: {:?}",
        state.modifiers_data.custom::<kurbo::Vec2>("snap_to_grid")
    );
    assert!(!order.contains(&names::FLIP));
    let snap = order.iter().position(|n| *n == "snap_to_grid").unwrap();
    let prevent = order.iter().position(|n| *n == names::PREVENT_OVERFLOW).unwrap();
    assert!(prevent < snap);
    // Origin (131, 203) snaps to (128, 200).
    assert_eq!(
        state.popper_rect(),
        Some(rect_from_xywh(128.0, 200.0, 90.0, 50.0))
    );

    let state = instance
        .set_options(OptionsUpdate {
            placement: Some(Placement::LEFT),
            ..OptionsUpdate::default()
        })
        .expect("measured");
    println!("== Left ==\n  popper rect: {:?}", state.popper_rect());
    // Origin (11, 193) snaps to (8, 192).
    assert_eq!(state.popper_rect(), Some(rect_from_xywh(8.0, 192.0, 90.0, 50.0)));
}
