// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_placement --heading-base-level=0

//! Understory Placement: headless anchored positioning for floating UI.
//!
//! Given a reference element (a button, a caret, a cell) and a floating element (tooltip,
//! dropdown, popover), this crate computes where the floating element goes so that it stays
//! attached to the reference, stays inside its clipping boundaries, and flips to another side
//! when the preferred one has no room.
//!
//! The work is done by a pipeline of named [modifiers](modifiers). Each one reads and
//! writes a shared [`State`]; a dependency [resolver](resolver) orders them once per
//! configuration. You can replace or disable any built-in by name, and add your own.
//!
//! ## Not a renderer
//!
//! The engine performs no I/O. A host implements the [`Measure`], [`Observer`], and
//! [`StyleWriter`] traits from [`platform`] to supply rects and scroll/resize events and to
//! apply the resulting [`Style`]s. With [`Platform::headless`] the output stays in the state
//! snapshot and nothing is written anywhere. [`headless::Scene`] is an in-memory host used by
//! the tests and demos.
//!
//! ## API overview
//!
//! - [`Instance`]: owns one state, runs passes, manages effect lifetimes.
//!   - [`Instance::update`] → coalesced [`UpdateHandle`], resolved by the [`Scheduler`].
//!   - [`Instance::force_update`] → runs a pass now.
//!   - [`Instance::set_options`] → re-resolve modifiers and reconcile effects.
//!   - [`Instance::destroy`] → release every effect once.
//! - [`Options`]: placement, strategy, modifier list, first-update callback.
//! - [`ModifierDescriptor`]: one pipeline stage, with optional `run` and `effect` closures.
//! - [`order_modifiers`]: merge by name, drop disabled, order by dependencies and phase.
//! - [`detect_overflow`](overflow::detect_overflow): per-side overflow against a clipping area.
//!
//! ## Example
//!
//! ```rust
//! use understory_placement::geometry::rect_from_xywh;
//! use understory_placement::headless::Scene;
//! use understory_placement::{ElementId, Elements, Instance, Options, Placement, TaskQueue};
//!
//! // A 200x25 viewport. The reference has 12 units of room above it and 5 below.
//! let scene = Scene::new(rect_from_xywh(0.0, 0.0, 200.0, 25.0));
//! let (button, tooltip) = (ElementId(1), ElementId(2));
//! scene.set_rect(button, rect_from_xywh(0.0, 12.0, 100.0, 8.0));
//! scene.set_rect(tooltip, rect_from_xywh(0.0, 0.0, 100.0, 10.0));
//!
//! let queue = TaskQueue::new();
//! let instance = Instance::new(
//!     Elements::new(button, tooltip),
//!     Options::default().with_placement(Placement::BOTTOM),
//!     scene.platform(),
//!     queue.clone(),
//! )
//! .unwrap();
//!
//! // Building requested the first update; the host runs it when convenient.
//! let first = instance.update();
//! assert_eq!(queue.run_pending(), 1);
//! let state = first.result().unwrap().unwrap();
//!
//! // Bottom does not fit, so the tooltip flipped above the button.
//! assert_eq!(state.placement, Placement::TOP);
//! assert_eq!(state.popper_rect(), Some(rect_from_xywh(0.0, 2.0, 100.0, 10.0)));
//! assert!(scene.applied_style(tooltip).is_some());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod error;
pub mod geometry;
pub mod headless;
pub mod instance;
pub mod modifier;
pub mod modifiers;
pub mod overflow;
pub mod platform;
pub mod resolver;
pub mod schedule;
pub mod state;
pub mod types;

pub use error::{ConfigError, MeasureError, PlacementError};
pub use instance::{Instance, UpdateRequester};
pub use modifier::{ModifierArgs, ModifierDescriptor, Phase};
pub use platform::{Disposer, Measure, Observer, Platform, StyleWriter};
pub use resolver::order_modifiers;
pub use schedule::{Scheduler, TaskQueue, UpdateHandle};
pub use state::{Options, OptionsUpdate, Snapshot, State, Style};
pub use types::{Alignment, Axis, ElementId, Elements, Placement, Side, Strategy};
