// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tooltip with an arrow that flips above its button when there is no room below.
//!
//! Run:
//! - `cargo run -p understory_examples --example tooltip_flip`

use understory_placement::geometry::rect_from_xywh;
use understory_placement::headless::Scene;
use understory_placement::modifiers::offset::{Displacement, OffsetOptions, OffsetSpec, offset};
use understory_placement::state::Transform;
use understory_placement::{ElementId, Elements, Instance, Options, Placement, TaskQueue};

const BUTTON: ElementId = ElementId(1);
const TOOLTIP: ElementId = ElementId(2);
const ARROW: ElementId = ElementId(3);

fn main() {
    // The button sits near the bottom of a 400x200 window.
    let scene = Scene::new(rect_from_xywh(0.0, 0.0, 400.0, 200.0));
    scene.set_rect(BUTTON, rect_from_xywh(150.0, 150.0, 100.0, 24.0));
    scene.set_rect(TOOLTIP, rect_from_xywh(0.0, 0.0, 120.0, 40.0));
    scene.set_rect(ARROW, rect_from_xywh(0.0, 0.0, 10.0, 5.0));

    let queue = TaskQueue::new();
    let options = Options::default()
        .with_placement(Placement::BOTTOM)
        .with_modifier(offset(OffsetOptions {
            offset: OffsetSpec::Fixed(Displacement {
                main_axis: 8.0,
                cross_axis: 0.0,
            }),
        }))
        .with_on_first_update(|state| println!("first placement: {}", state.placement));
    let tooltip = Instance::new(
        Elements {
            reference: BUTTON,
            popper: TOOLTIP,
            arrow: Some(ARROW),
        },
        options,
        scene.platform(),
        queue.clone(),
    )
    .expect("default modifiers resolve");

    let update = tooltip.update();
    queue.run_pending();
    let state = update.result().expect("ran").expect("measured");

    println!("== Tooltip ==");
    println!("  placement: {}", state.placement);
    println!("  popper rect: {:?}", state.popper_rect());
    println!("  arrow: {:?}", state.modifiers_data.arrow());
    println!("  written style: {:?}", scene.applied_style(TOOLTIP));

    // 8 units above the button, centered on it.
    assert_eq!(state.placement, Placement::TOP);
    assert_eq!(
        state.popper_rect(),
        Some(rect_from_xywh(140.0, 102.0, 120.0, 40.0))
    );
    assert!(matches!(
        scene.applied_style(TOOLTIP).and_then(|s| s.transform),
        Some(Transform::Translate(_))
    ));
    assert!(scene.applied_style(ARROW).is_some());

    tooltip.destroy();
    assert!(scene.applied_style(TOOLTIP).is_none());
}
