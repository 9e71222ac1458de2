// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dropdown menu inside a scrolling panel.
//!
//! The menu slides left to stay inside the panel, and reports when its trigger has been
//! scrolled out of view. Updates are driven by the panel's scroll events.
//!
//! Run:
//! - `cargo run -p understory_examples --example dropdown_in_scroll_panel`

use understory_placement::geometry::rect_from_xywh;
use understory_placement::headless::Scene;
use understory_placement::modifiers::hide::REFERENCE_HIDDEN_ATTRIBUTE;
use understory_placement::state::AttributeValue;
use understory_placement::types::ScrollTarget;
use understory_placement::{ElementId, Elements, Instance, Options, Placement, TaskQueue};

const PANEL: ElementId = ElementId(10);
const TRIGGER: ElementId = ElementId(11);
const MENU: ElementId = ElementId(12);

fn main() {
    let scene = Scene::new(rect_from_xywh(0.0, 0.0, 800.0, 600.0));
    scene.set_rect(PANEL, rect_from_xywh(0.0, 0.0, 300.0, 400.0));
    scene.set_computed_style(PANEL, "overflow", "auto");
    let ancestors = vec![ScrollTarget::Element(PANEL), ScrollTarget::Viewport];
    scene.set_scroll_parents(TRIGGER, ancestors.clone());
    scene.set_scroll_parents(MENU, ancestors);
    scene.set_rect(TRIGGER, rect_from_xywh(220.0, 40.0, 60.0, 20.0));
    scene.set_rect(MENU, rect_from_xywh(0.0, 0.0, 150.0, 200.0));

    let queue = TaskQueue::new();
    let menu = Instance::new(
        Elements::new(TRIGGER, MENU),
        Options::default().with_placement(Placement::BOTTOM_START),
        scene.platform(),
        queue.clone(),
    )
    .expect("default modifiers resolve");
    queue.run_pending();

    let state = menu.state();
    println!("== Open ==");
    println!("  popper rect: {:?}", state.popper_rect());
    println!("  slid by: {:?}", state.modifiers_data.prevent_overflow());
    // 70 past the panel's right edge, slid back.
    assert_eq!(
        state.popper_rect(),
        Some(rect_from_xywh(150.0, 60.0, 150.0, 200.0))
    );

    // Scroll the panel so the trigger leaves it through the top.
    scene.set_rect(TRIGGER, rect_from_xywh(220.0, -30.0, 60.0, 20.0));
    let fired = scene.emit_scroll(ScrollTarget::Element(PANEL));
    println!("== Scrolled ==\n  callbacks: {fired}, queued: {}", queue.len());
    queue.run_pending();

    let state = menu.state();
    let hide = state.modifiers_data.hide().copied().expect("hide ran");
    println!("  hide: {hide:?}");
    assert!(hide.is_reference_hidden);
    assert!(!hide.has_popper_escaped);
    assert_eq!(
        scene
            .applied_attributes(MENU)
            .and_then(|a| a.get(REFERENCE_HIDDEN_ATTRIBUTE).cloned()),
        Some(AttributeValue::Flag(true))
    );

    drop(menu);
    assert_eq!(scene.live_subscriptions(), 0);
}
